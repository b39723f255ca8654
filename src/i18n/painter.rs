//! Applies dictionaries and locale metadata to the document.

use crate::dom::Document;
use crate::i18n::{Dictionary, Locale};

/// Replace the text of every translatable element whose key is in `dict`.
///
/// Elements with unknown keys keep whatever text they already had.
/// Returns the number of elements painted.
pub fn paint(doc: &mut Document, dict: &Dictionary) -> usize {
    let mut painted = 0;
    for el in doc.translatable_mut() {
        let Some(text) = el.i18n_key().and_then(|key| dict.get(key)) else {
            continue;
        };
        el.text = text.to_string();
        painted += 1;
    }
    painted
}

/// Hide every translatable element. Only used around the first paint.
pub fn hide_all(doc: &mut Document) {
    doc.translatable_mut().for_each(|el| el.hidden = true);
}

pub fn show_all(doc: &mut Document) {
    doc.translatable_mut().for_each(|el| el.hidden = false);
}

/// Set the root `lang` and `dir` attributes for `locale`.
pub fn apply_locale_metadata(doc: &mut Document, locale: Locale) {
    doc.lang = locale.code().to_string();
    doc.dir = locale.direction().as_str().to_string();
}
