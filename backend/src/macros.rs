//! Shared macros for the backend crate.

/// Generate a `fmt::Debug` implementation that hides credential fields.
///
/// Field kinds, given as a keyword before the field name:
///
/// - `show field` prints the value normally
/// - `redact field` always prints `"[REDACTED]"`
/// - `redact_nonempty field` prints `""` for an empty string and
///   `"[REDACTED]"` otherwise, so sanitized records stay recognisable in logs
/// - `redact_option field` prints `Some("[REDACTED]")` or `None`
///
/// ```ignore
/// redacted_debug!(Server {
///     show host,
///     redact_nonempty password,
/// });
/// ```
macro_rules! redacted_debug {
    ($name:ident { $( $kind:ident $field:ident ),* $(,)? }) => {
        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut s = f.debug_struct(stringify!($name));
                $( redacted_debug!(@add_field s, self, $kind, $field); )*
                s.finish()
            }
        }
    };
    (@add_field $s:ident, $self:ident, show, $field:ident) => {
        $s.field(stringify!($field), &$self.$field);
    };
    (@add_field $s:ident, $self:ident, redact, $field:ident) => {
        $s.field(stringify!($field), &"[REDACTED]");
    };
    (@add_field $s:ident, $self:ident, redact_nonempty, $field:ident) => {
        $s.field(
            stringify!($field),
            &if $self.$field.is_empty() { "" } else { "[REDACTED]" },
        );
    };
    (@add_field $s:ident, $self:ident, redact_option, $field:ident) => {
        $s.field(stringify!($field), &$self.$field.as_ref().map(|_| "[REDACTED]"));
    };
}

#[cfg(test)]
mod tests {
    #[allow(dead_code)]
    struct Credentials {
        pub username: String,
        pub password: String,
        pub key_path: String,
        pub passphrase: Option<String>,
    }

    redacted_debug!(Credentials {
        show username,
        redact password,
        redact_nonempty key_path,
        redact_option passphrase,
    });

    #[test]
    fn test_redacted_debug_hides_credentials() {
        let c = Credentials {
            username: "backup".to_string(),
            password: "s3cret-pass".to_string(),
            key_path: "/home/backup/.ssh/id_ed25519".to_string(),
            passphrase: Some("unlock-me".to_string()),
        };
        let output = format!("{:?}", c);
        assert!(output.contains("backup"));
        assert!(!output.contains("s3cret-pass"));
        assert!(!output.contains("id_ed25519"));
        assert!(!output.contains("unlock-me"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn test_redact_nonempty_shows_cleared_value() {
        let c = Credentials {
            username: "backup".to_string(),
            password: String::new(),
            key_path: String::new(),
            passphrase: None,
        };
        let output = format!("{:?}", c);
        assert!(output.contains("key_path: \"\""));
        assert!(output.contains("passphrase: None"));
    }
}
