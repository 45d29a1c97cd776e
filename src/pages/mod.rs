//! HTML page rendering
//!
//! Pages are plain template files with `{{NAME}}` placeholders, read from
//! the configured template directory at request time so they can be
//! edited without restarting the server.

use crate::error::{Error, Result};
use std::path::Path;

/// Load a template and substitute placeholders.
pub async fn render(dir: &Path, name: &str, substitutions: &[(&str, &str)]) -> Result<String> {
    let path = dir.join(name);
    let mut html = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| Error::Template(format!("{}: {e}", path.display())))?;

    for (key, value) in substitutions {
        html = html.replace(&format!("{{{{{key}}}}}"), value);
    }

    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn template_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates")
    }

    #[tokio::test]
    async fn renders_index_with_substitutions() {
        let html = render(
            &template_dir(),
            "index.html",
            &[("IP", "192.168.1.10"), ("PORT", "8000")],
        )
        .await
        .expect("index renders");

        assert!(html.contains("192.168.1.10"));
        assert!(!html.contains("{{IP}}"));
        assert!(!html.contains("{{PORT}}"));
    }

    #[tokio::test]
    async fn missing_template_is_a_template_error() {
        let err = render(&template_dir(), "nope.html", &[])
            .await
            .expect_err("missing file fails");
        assert!(matches!(err, Error::Template(_)));
    }
}
