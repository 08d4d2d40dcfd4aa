use serde::Deserialize;


#[derive(Deserialize)]
struct ContentPage {
    #[serde(default)]
    data: Vec<ContentPart>,
}

#[derive(Deserialize)]
struct ContentPart {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Turns a raw file content payload into displayable text.
///
/// Invalid UTF-8 sequences are replaced with U+FFFD. If the payload is the
/// service's content-page JSON, its text parts are extracted and joined with
/// newlines; any other payload is returned as decoded.
pub fn decode_content(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);

    if let Ok(page) = serde_json::from_str::<ContentPage>(&text) {
        let parts = page.data.into_iter()
            .filter(|part| part.kind.as_deref().is_none_or(|kind| kind == "text"))
            .filter_map(|part| part.text)
            .collect::<Vec<_>>();
        if !parts.is_empty() {
            return parts.join("\n");
        }
    }

    text.into_owned()
}
