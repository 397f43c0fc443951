use url::Url;

/// Check the shape of a YouTube video id (11 characters of `[0-9A-Za-z_-]`)
pub fn is_video_id(candidate: &str) -> bool {
    candidate.len() == 11
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Extract the video id from a watch, short, embed, live or youtu.be URL, or a bare id
pub fn video_id_from_url(input: &str) -> Option<String> {
    let input = input.trim();

    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };

    if let Ok(parsed) = Url::parse(&candidate) {
        if let Some((_, v)) = parsed.query_pairs().find(|(key, _)| key == "v") {
            if is_video_id(&v) {
                return Some(v.into_owned());
            }
        }

        let host = parsed.host_str().unwrap_or_default().to_lowercase();
        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let id = match segments.as_slice() {
            [id, ..] if host.ends_with("youtu.be") => Some(*id),
            ["shorts" | "embed" | "live" | "v", id, ..] => Some(*id),
            _ => None,
        };

        if let Some(id) = id.filter(|id| is_video_id(id)) {
            return Some(id.to_string());
        }
    }

    is_video_id(input).then(|| input.to_string())
}

/// Extract the playlist id from the `list=` parameter of a URL
pub fn playlist_id_from_url(input: &str) -> Option<String> {
    let (_, rest) = input.split_once("list=")?;
    let id = rest.split(['&', '#']).next().unwrap_or_default().trim();

    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}
