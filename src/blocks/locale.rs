//! Localized terminal surface forms
//!
//!     Keywords are not spelled in the grammar. A terminal such as `display` is declared once,
//!     and each locale table says how learners write it: `display` or `print` in English,
//!     `afficher` in French, `mostrar` in Spanish. The grammar compiler folds every enabled
//!     locale's forms into the rule table, so any of them satisfies the same grammar position.
//!
//!     A form starting with `@` is an alias: `@other` makes the symbol an equivalent of the
//!     symbol `other` instead of adding a literal. Aliases are unit productions and may close
//!     cycles, which is why the parsers carry an explicit unit-chain bound. Write `@@` for a
//!     literal leading `@`.
//!
//!     The compiler only sees the [SurfaceForms] trait. [LocaleTable] is the YAML-backed
//!     implementation used by the bundled engine.

use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;

/// Opaque `(locale, symbol) -> surface forms` lookup.
pub trait SurfaceForms {
    /// Surface forms for `symbol` in `locale`, in declaration order. Empty when unknown.
    fn surface_forms(&self, locale: &str, symbol: &str) -> &[String];
}

/// A surface form, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceForm<'a> {
    /// Text the learner types
    Text(&'a str),
    /// Equivalence with another grammar symbol
    Alias(&'a str),
}

impl<'a> SurfaceForm<'a> {
    pub fn classify(form: &'a str) -> Self {
        if form.starts_with("@@") {
            return SurfaceForm::Text(&form[1..]);
        }
        match form.strip_prefix('@') {
            Some(symbol) => SurfaceForm::Alias(symbol),
            None => SurfaceForm::Text(form),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(form) => vec![form],
            OneOrMany::Many(forms) => forms,
        }
    }
}

#[derive(Debug, Deserialize)]
struct LocaleDocument {
    locale: String,
    #[serde(default)]
    terms: HashMap<String, OneOrMany>,
}

/// Errors raised while loading locale documents
#[derive(Debug, Clone, PartialEq)]
pub enum LocaleError {
    Malformed(String),
}

impl fmt::Display for LocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocaleError::Malformed(msg) => write!(f, "Malformed locale table: {}", msg),
        }
    }
}

impl std::error::Error for LocaleError {}

/// In-memory locale table, one map of symbol forms per locale code.
#[derive(Debug, Clone, Default)]
pub struct LocaleTable {
    locales: Vec<String>,
    terms: HashMap<String, HashMap<String, Vec<String>>>,
}

impl LocaleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a surface form. Repeated forms are kept once.
    pub fn insert(&mut self, locale: &str, symbol: &str, form: impl Into<String>) {
        if !self.locales.iter().any(|l| l == locale) {
            self.locales.push(locale.to_string());
        }
        let forms = self
            .terms
            .entry(locale.to_string())
            .or_default()
            .entry(symbol.to_string())
            .or_default();
        let form = form.into();
        if !forms.contains(&form) {
            forms.push(form);
        }
    }

    /// Builder-style [insert](Self::insert).
    pub fn with(mut self, locale: &str, symbol: &str, form: impl Into<String>) -> Self {
        self.insert(locale, symbol, form);
        self
    }

    /// Load one locale document (`locale:` code plus `terms:` map) into the table.
    pub fn load_yaml(&mut self, source: &str) -> Result<(), LocaleError> {
        let document: LocaleDocument =
            serde_yaml::from_str(source).map_err(|e| LocaleError::Malformed(e.to_string()))?;
        let mut symbols: Vec<_> = document.terms.into_iter().collect();
        symbols.sort_by(|a, b| a.0.cmp(&b.0));
        if symbols.is_empty() && !self.locales.contains(&document.locale) {
            self.locales.push(document.locale.clone());
        }
        for (symbol, forms) in symbols {
            for form in forms.into_vec() {
                self.insert(&document.locale, &symbol, form);
            }
        }
        Ok(())
    }

    /// Locale codes in load order.
    pub fn locales(&self) -> &[String] {
        &self.locales
    }
}

impl SurfaceForms for LocaleTable {
    fn surface_forms(&self, locale: &str, symbol: &str) -> &[String] {
        self.terms
            .get(locale)
            .and_then(|symbols| symbols.get(symbol))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
