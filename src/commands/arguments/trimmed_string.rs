use std::{convert::Infallible, fmt::Display, str::FromStr};

/// A command argument with no leading or trailing whitespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedString(String);

impl TrimmedString {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for arguments that were nothing but whitespace.
    pub fn non_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.0)
        }
    }
}

impl FromStr for TrimmedString {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(TrimmedString(s.trim().to_owned()))
    }
}

impl From<&str> for TrimmedString {
    fn from(value: &str) -> Self {
        TrimmedString(value.trim().to_owned())
    }
}

impl From<TrimmedString> for String {
    fn from(value: TrimmedString) -> Self {
        value.0
    }
}

impl Display for TrimmedString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TrimmedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::TrimmedString;

    #[test]
    fn trimmed() {
        assert_eq!(TrimmedString::from("{OC} {IC}").as_ref(), "{OC} {IC}");
    }

    #[test]
    fn untrimmed() {
        assert_eq!(
            TrimmedString::from("  Welcome  \t aboard   ").as_ref(),
            "Welcome  \t aboard"
        );
    }

    #[test]
    fn blank_is_none() {
        assert_eq!(TrimmedString::from(" \t ").non_empty(), None);
        assert_eq!(
            TrimmedString::from(" #FF0000 ").non_empty().as_deref(),
            Some("#FF0000")
        );
    }
}
