//! QR code rendering for connection URLs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use qrcode::render::svg;
use qrcode::QrCode;

/// Render a URL as a QR code and return it as an inline `data:` URI
/// suitable for an `<img src>` attribute. Returns an empty string when
/// encoding fails; the landing page simply shows no code in that case.
pub fn data_uri(url: &str) -> String {
    let code = match QrCode::new(url.as_bytes()) {
        Ok(code) => code,
        Err(e) => {
            tracing::warn!(error = %e, url = %url, "QR encoding failed");
            return String::new();
        }
    };

    let image = code
        .render::<svg::Color>()
        .min_dimensions(180, 180)
        .dark_color(svg::Color("#00d4ff"))
        .light_color(svg::Color("#0d1f2d"))
        .build();

    format!("data:image/svg+xml;base64,{}", BASE64.encode(image))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_data_uri() {
        let uri = data_uri("http://192.168.1.10:8000/admin");
        assert!(uri.starts_with("data:image/svg+xml;base64,"));

        let encoded = uri.trim_start_matches("data:image/svg+xml;base64,");
        let decoded = BASE64.decode(encoded).expect("valid base64");
        let svg = String::from_utf8(decoded).expect("utf8 svg");
        assert!(svg.contains("<svg"));
    }
}
