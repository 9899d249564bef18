//! Placeholder substitution for packaged resources
//!
//! Scripts and style sheets are full of curly braces, so they mark
//! placeholders as `%(key)s`. Every other resource (XUL, RDF, DTD,
//! properties, manifest) uses `{key}`. The syntax is picked once per logical
//! path by [`PlaceholderSyntax::for_path`].

pub mod store;

pub use store::{DirectoryTemplates, EmbeddedTemplates, TemplateStore};

use crate::error::{PackagerError, Result};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::path::Path;

lazy_static! {
    static ref SCRIPT_STYLE_PLACEHOLDER: Regex =
        Regex::new(r"%\(([A-Za-z_][A-Za-z0-9_]*)\)s").unwrap();

    static ref MARKUP_STYLE_PLACEHOLDER: Regex =
        Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderSyntax {
    /// `%(key)s`, for `.js` and `.css`
    ScriptStyle,
    /// `{key}`, for everything else
    MarkupStyle,
}

impl PlaceholderSyntax {
    pub fn for_path(logical_path: &str) -> Self {
        match Path::new(logical_path).extension().and_then(|e| e.to_str()) {
            Some("js") | Some("css") => PlaceholderSyntax::ScriptStyle,
            _ => PlaceholderSyntax::MarkupStyle,
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            PlaceholderSyntax::ScriptStyle => &SCRIPT_STYLE_PLACEHOLDER,
            PlaceholderSyntax::MarkupStyle => &MARKUP_STYLE_PLACEHOLDER,
        }
    }
}

/// Named values substituted into a template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutions(BTreeMap<String, String>);

impl Substitutions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Substitutions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Render a template blob.
///
/// Without substitutions the text is returned as-is apart from trimming.
/// Otherwise every placeholder is replaced in a single pass, so substituted
/// values are never scanned for further placeholders. A placeholder with no
/// matching key fails the render; unused keys are fine. In `.properties`
/// files every value is confined to its line, see [`properties_value`].
pub fn render(logical_path: &str, blob: &[u8], substitutions: Option<&Substitutions>) -> Result<String> {
    let text = std::str::from_utf8(blob)
        .map_err(|_| PackagerError::InvalidTemplateEncoding(logical_path.to_string()))?;

    let substitutions = match substitutions {
        Some(substitutions) if !substitutions.is_empty() => substitutions,
        _ => return Ok(text.trim().to_string()),
    };

    let pattern = PlaceholderSyntax::for_path(logical_path).pattern();
    let is_properties = Path::new(logical_path)
        .extension()
        .map_or(false, |ext| ext == "properties");

    if let Some(missing) = pattern
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|key| !substitutions.contains_key(key))
    {
        return Err(PackagerError::MissingPlaceholder {
            file: logical_path.to_string(),
            key: missing,
        });
    }

    let rendered = pattern.replace_all(text, |caps: &Captures| {
        let value = substitutions.get(&caps[1]).unwrap_or_default();
        if is_properties {
            properties_value(value)
        } else {
            value.to_string()
        }
    });

    Ok(rendered.trim().to_string())
}

/// Escape a value for a `key=value` line of a string bundle.
///
/// Backslashes are doubled and line breaks become `\n`, so the value can
/// neither end its line early nor start a new property.
pub fn properties_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace("\r\n", "\\n")
        .replace(['\r', '\n'], "\\n")
}

/// Renders templates pulled from a [`TemplateStore`].
pub struct TemplateRenderer {
    store: Box<dyn TemplateStore>,
}

impl TemplateRenderer {
    pub fn new(store: impl TemplateStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn store(&self) -> &dyn TemplateStore {
        self.store.as_ref()
    }

    pub fn render(&self, logical_path: &str, substitutions: Option<&Substitutions>) -> Result<String> {
        let blob = self.store.read(logical_path)?;
        render(logical_path, &blob, substitutions)
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(EmbeddedTemplates)
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn subs() -> Substitutions {
        Substitutions::new().with("foo", "test").with("bar", "mozilla")
    }

    #[test_case("chrome/content/overlay.js", PlaceholderSyntax::ScriptStyle)]
    #[test_case("chrome/skin/overlay.css", PlaceholderSyntax::ScriptStyle)]
    #[test_case("chrome/content/options.xul", PlaceholderSyntax::MarkupStyle)]
    #[test_case("chrome/locale/en-US/overlay.properties", PlaceholderSyntax::MarkupStyle)]
    #[test_case("chrome.manifest", PlaceholderSyntax::MarkupStyle)]
    #[test_case("install.rdf", PlaceholderSyntax::MarkupStyle)]
    fn test_syntax_for_path(path: &str, expected: PlaceholderSyntax) {
        assert_eq!(PlaceholderSyntax::for_path(path), expected);
    }

    #[test]
    fn test_render_markup_style() {
        let output = render("test.txt", b"i {foo} at {bar}", Some(&subs())).unwrap();
        assert_eq!(output, "i test at mozilla");
    }

    #[test]
    fn test_render_script_style() {
        let blob = b"var %(foo)s = { at: \"%(bar)s\" };";
        let output = render("test.js", blob, Some(&subs())).unwrap();
        assert_eq!(output, "var test = { at: \"mozilla\" };");
    }

    #[test]
    fn test_render_without_substitutions_leaves_tokens() {
        let blob = b"  var %(foo)s = {};\n";
        assert_eq!(render("test.js", blob, None).unwrap(), "var %(foo)s = {};");
        assert_eq!(
            render("test.js", blob, Some(&Substitutions::new())).unwrap(),
            "var %(foo)s = {};"
        );
        assert_eq!(render("test.txt", b"{foo}\n", None).unwrap(), "{foo}");
    }

    #[test]
    fn test_braces_in_scripts_are_literal() {
        let blob = b"function f() { return %(foo)s; }";
        let output = render("test.js", blob, Some(&subs())).unwrap();
        assert_eq!(output, "function f() { return test; }");
    }

    #[test]
    fn test_missing_placeholder_names_file_and_key() {
        let err = render("chrome/content/about.xul", b"{foo} {nope}", Some(&subs())).unwrap_err();
        match err {
            PackagerError::MissingPlaceholder { file, key } => {
                assert_eq!(file, "chrome/content/about.xul");
                assert_eq!(key, "nope");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unused_keys_are_ignored() {
        let output = render("test.txt", b"just {foo}", Some(&subs())).unwrap();
        assert_eq!(output, "just test");
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let subs = Substitutions::new().with("foo", "{bar}").with("bar", "x");
        assert_eq!(render("test.txt", b"{foo}{bar}", Some(&subs)).unwrap(), "{bar}x");
    }

    #[test]
    fn test_guid_braces_are_not_placeholders() {
        let blob = b"<em:id>{ec8030f7-c20a-464f-9b0e-13a3a9e97384}</em:id>{foo}";
        let output = render("install.rdf", blob, Some(&subs())).unwrap();
        assert_eq!(output, "<em:id>{ec8030f7-c20a-464f-9b0e-13a3a9e97384}</em:id>test");
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let err = render("broken.xul", &[0xff, 0xfe], None).unwrap_err();
        assert!(matches!(err, PackagerError::InvalidTemplateEncoding(path) if path == "broken.xul"));
    }

    #[test]
    fn test_properties_values_stay_on_one_line() {
        let subs = Substitutions::new().with("description", "line one\nline two\r\nc:\\x");
        let out =
            render("overlay.properties", b"a=1\ndesc={description}\nb=2", Some(&subs)).unwrap();
        assert_eq!(out, "a=1\ndesc=line one\\nline two\\nc:\\\\x\nb=2");
        assert_eq!(out.lines().count(), 3);

        let xul = render("about.xul", b"<d>{description}</d>", Some(&subs)).unwrap();
        assert_eq!(xul, "<d>line one\nline two\r\nc:\\x</d>");
    }

    #[test]
    fn test_renderer_reads_from_store() {
        let renderer = TemplateRenderer::default();
        let subs = Substitutions::new().with("slug", "my_addon").with("id", "me@example.com");
        let prefs = renderer.render("defaults/preferences/prefs.js", Some(&subs)).unwrap();
        assert!(prefs.contains(r#"pref("extensions.my_addon.boolpref", false);"#));
        assert!(prefs.contains(r#"pref("extensions.me@example.com.description", "chrome://my_addon/locale/overlay.properties");"#));
    }
}
