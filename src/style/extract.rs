//! Content-hashed stylesheet extraction.

use crate::asset::hash::hashed_name;
use crate::asset::{AssetManifest, BuildOutput, ManifestError};

/// Write `css` to `assets/css/<hash>.css` and record it as `main.css`.
pub fn extract(css: String, output: &mut BuildOutput) -> Result<String, ManifestError> {
    let path = format!("assets/css/{}", hashed_name(css.as_bytes(), "css"));
    output
        .manifest_mut()
        .insert(AssetManifest::MAIN_CSS, path.clone())?;
    output.insert(path.clone(), css);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract() {
        let mut output = BuildOutput::new();
        let path = extract(".btn{color:red}".into(), &mut output).unwrap();
        assert!(path.starts_with("assets/css/"));
        assert_eq!(output.get(&path), Some(&b".btn{color:red}"[..]));
        assert_eq!(output.manifest().get("main.css"), Some(path.as_str()));
    }

    #[test]
    fn test_extract_twice_is_manifest_error() {
        let mut output = BuildOutput::new();
        extract(".a{}".into(), &mut output).unwrap();
        assert!(extract(".b{}".into(), &mut output).is_err());
    }
}
