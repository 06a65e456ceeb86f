use crate::utils::validation::FieldResult;
use crate::utils::error::ValidationError;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A person's name as exported by the dispatch system.
///
/// Accepts `"Last, First"` and `"First [Middle] Last"`. A single word (a
/// club account such as `"Cher"` or `"Intro"`) is kept verbatim and has no
/// first/last parts. Equality, hashing and ordering use the parsed parts, so
/// `"Doe, John"` and `"John Doe"` are the same payee.
#[derive(Debug, Clone)]
pub struct Name {
    raw: String,
    last: String,
    first: String,
}

impl Name {
    pub fn parse(field: &str, value: &str) -> FieldResult<Self> {
        let raw = value.trim().to_string();
        let (last, first) = if raw.contains(',') {
            let parts: Vec<&str> = raw.split(',').collect();
            if parts.len() != 2 {
                return Err(ValidationError::new(
                    field,
                    format!("name '{}' must be in 'Last, First' format", raw),
                ));
            }
            (parts[0].trim().to_string(), parts[1].trim().to_string())
        } else if raw.contains(char::is_whitespace) {
            let mut parts: Vec<&str> = raw.split_whitespace().collect();
            let last = parts.pop().unwrap_or_default().to_string();
            (last, parts.join(" "))
        } else {
            (String::new(), String::new())
        };

        Ok(Self { raw, last, first })
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// 排序用姓氏；單一名稱時回傳原字串
    pub fn sort_last_name(&self) -> &str {
        if self.last.is_empty() {
            &self.raw
        } else {
            &self.last
        }
    }

    fn has_parts(&self) -> bool {
        !self.last.is_empty() && !self.first.is_empty()
    }

    fn sort_key(&self) -> (&str, &str) {
        if self.last.is_empty() && self.first.is_empty() {
            (&self.raw, "")
        } else {
            (&self.last, &self.first)
        }
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_parts() {
            write!(f, "{}, {}", self.last, self.first)
        } else {
            f.write_str(&self.raw)
        }
    }
}

impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Name {}

impl Hash for Name {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sort_key().hash(state);
    }
}

impl PartialOrd for Name {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}
