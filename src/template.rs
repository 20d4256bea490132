//! HTML rendering of post pages and the missing-page body

use crate::model::RenderPayload;
use crate::sanitize::sanitize;

const IMAGE_WIDTH: u32 = 640;
const IMAGE_HEIGHT: u32 = 360;

/// Entity for characters that must not appear raw in text or attribute values.
fn entity(c: char) -> Option<&'static str> {
    match c {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#x27;"),
        _ => None,
    }
}

/// Escapes a string for safe embedding in HTML text or attribute values.
///
/// Runs of safe characters are copied as whole slices.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if let Some(replacement) = entity(c) {
            out.push_str(&s[start..i]);
            out.push_str(replacement);
            start = i + c.len_utf8();
        }
    }
    out.push_str(&s[start..]);
    out
}

/// Site name shown in previews: the first DNS label of the host.
fn site_name(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

fn push_meta(buf: &mut String, property: &str, content: &str) {
    buf.push_str(&format!(
        "<meta property=\"{}\" content=\"{}\">\n",
        property,
        escape_html(content),
    ));
}

/// Renders the full post page with OpenGraph and article meta tags.
///
/// The post body is inserted as-is; everything else is escaped.
pub fn render_post(payload: &RenderPayload) -> String {
    let post = &payload.post;
    let title = post.title();
    let page_url = format!("https://{}/{}", payload.host, payload.path);
    let image = post.image();
    let image_alt = post.image_alt();

    let mut html = String::with_capacity(8192);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");

    push_meta(&mut html, "og:title", title);
    html.push_str(&format!(
        "<link rel=\"canonical\" href=\"{}\">\n",
        escape_html(&page_url)
    ));
    push_meta(&mut html, "og:description", &sanitize(post.excerpt.as_deref()));
    push_meta(&mut html, "og:url", &page_url);
    push_meta(&mut html, "og:type", "article");
    push_meta(&mut html, "og:locale", "en_US");
    push_meta(&mut html, "og:site_name", site_name(&payload.host));
    if let Some(published) = post.published_time() {
        push_meta(&mut html, "article:published_time", &published);
    }
    if let Some(modified) = post.modified_time() {
        push_meta(&mut html, "article:modified_time", &modified);
    }
    if let Some(image) = image {
        push_meta(&mut html, "og:image", &image.source_url);
        push_meta(&mut html, "og:image:alt", image_alt);
    }
    if let Some(author) = post.author_name() {
        html.push_str(&format!(
            "<meta name=\"author\" content=\"{}\">\n",
            escape_html(author)
        ));
    }
    html.push_str(&format!("<title>{}</title>\n</head>\n<body>\n", escape_html(title)));

    html.push_str("<div class=\"post-container\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
    if let Some(image) = image {
        html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" width=\"{}\" height=\"{}\">\n",
            escape_html(&image.source_url),
            escape_html(image_alt),
            IMAGE_WIDTH,
            IMAGE_HEIGHT,
        ));
    }
    html.push_str("<article>");
    html.push_str(post.content.as_deref().unwrap_or_default());
    html.push_str("</article>\n</div>\n</body>\n</html>");

    html
}

/// Standard missing-page body.
pub fn render_not_found() -> String {
    "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
     <title>404: This page could not be found</title>\n</head>\n<body>\n\
     <h1>404</h1>\n<p>This page could not be found.</p>\n</body>\n</html>"
        .to_string()
}
