pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load a command's JSON input from `--input <file>`, falling back to stdin.
pub fn load<T: DeserializeOwned>(
    path: Option<&str>,
    what: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return file::read_json(path);
    }
    match stdin::read_stdin()? {
        Some(value) => Ok(value),
        None => Err(format!("--input <file.json> or stdin required for {}", what).into()),
    }
}
