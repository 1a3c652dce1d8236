//! `wright.path`: lexical path helpers for build files.
//!
//! Nothing here touches the filesystem except `exists`.

use std::path::{Component, Path, PathBuf};

use mlua::prelude::*;

/// Drop `.` components and fold `..` into their parent.
pub fn normalize(path: &Path) -> PathBuf {
  path.components().fold(PathBuf::new(), |mut acc, component| {
    match component {
      Component::CurDir => {}
      Component::ParentDir => {
        acc.pop();
      }
      other => acc.push(other),
    }
    acc
  })
}

/// Relative path leading from `from` to `to`, `.` when they are equal.
pub fn relative(from: &Path, to: &Path) -> PathBuf {
  let from: Vec<_> = from.components().collect();
  let to: Vec<_> = to.components().collect();
  let shared = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

  let mut rel: PathBuf = std::iter::repeat_n(Component::ParentDir, from.len() - shared).collect();
  rel.extend(&to[shared..]);

  if rel.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    rel
  }
}

fn lossy(path: impl AsRef<Path>) -> String {
  path.as_ref().to_string_lossy().into_owned()
}

/// Build the `wright.path` table.
pub fn create_path_helpers(lua: &Lua) -> LuaResult<LuaTable> {
  let path = lua.create_table()?;

  path.set(
    "join",
    lua.create_function(|_, segments: LuaVariadic<String>| {
      Ok(lossy(segments.iter().collect::<PathBuf>()))
    })?,
  )?;

  path.set(
    "dirname",
    lua.create_function(|_, p: String| Ok(Path::new(&p).parent().map(lossy).unwrap_or_default()))?,
  )?;

  path.set(
    "basename",
    lua.create_function(|_, p: String| Ok(Path::new(&p).file_name().map(lossy).unwrap_or_default()))?,
  )?;

  path.set(
    "stem",
    lua.create_function(|_, p: String| Ok(Path::new(&p).file_stem().map(lossy).unwrap_or_default()))?,
  )?;

  // extension including the dot, empty when there is none
  path.set(
    "extname",
    lua.create_function(|_, p: String| {
      Ok(
        Path::new(&p)
          .extension()
          .map(|ext| format!(".{}", ext.to_string_lossy()))
          .unwrap_or_default(),
      )
    })?,
  )?;

  path.set(
    "is_absolute",
    lua.create_function(|_, p: String| Ok(Path::new(&p).is_absolute()))?,
  )?;

  path.set("exists", lua.create_function(|_, p: String| Ok(Path::new(&p).exists()))?)?;

  path.set(
    "normalize",
    lua.create_function(|_, p: String| Ok(lossy(normalize(Path::new(&p)))))?,
  )?;

  path.set(
    "relative",
    lua.create_function(|_, (from, to): (String, String)| Ok(lossy(relative(Path::new(&from), Path::new(&to)))))?,
  )?;

  path.set(
    "split",
    lua.create_function(|_, p: String| {
      Ok(
        Path::new(&p)
          .components()
          .map(|c| lossy(c.as_os_str()))
          .collect::<Vec<_>>(),
      )
    })?,
  )?;

  Ok(path)
}
