use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// `tel:` link for a phone number.
pub fn tel_link(phone: &str) -> String {
    format!("tel:{}", phone.trim())
}

/// WhatsApp chat link with a pre-filled message.
pub fn whatsapp_link(phone: &str, text: &str) -> String {
    format!("https://wa.me/{}?text={}", phone.trim(), encode_component(text))
}

/// Message pre-filled when contacting someone about a task.
pub fn task_message(title: &str) -> String {
    format!("Regarding task: {}", title)
}

/// Make a stored task link clickable: bare hosts get `https://`.
pub fn normalize_link(link: &str) -> String {
    let link = link.trim();
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else {
        format!("https://{}", link)
    }
}

/// Everything `encodeURIComponent` escapes: all but `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, URI_COMPONENT).to_string()
}
