//! Session options, addressed by dotted keys such as `narewrite.na.default_how`.
//!
//! Every option struct is declared with `config_namespace!`, which derives
//! the key walk (`visit`) and the string setter (`set`) from the fields.

use std::fmt::Display;

use anyhow::{anyhow, Result};

/// receives every leaf option while the tree is walked
trait Visit {
    fn some<V: Display>(&mut self, key: &str, value: V, description: &'static str);
}

/// a node of the option tree, either a leaf value or a namespace of options
trait ConfigField {
    fn visit<V: Visit>(&self, v: &mut V, key: &str, description: &'static str);
    /// `key` is the remaining path below this node
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// leaf options parse their value with `FromStr`, the remaining key is ignored
macro_rules! config_field {
    ($t:ty) => {
        impl ConfigField for $t {
            fn visit<V: Visit>(&self, v: &mut V, key: &str, description: &'static str) {
                v.some(key, self, description)
            }
            fn set(&mut self, _: &str, value: &str) -> Result<()> {
                *self = value
                    .parse()
                    .map_err(|e| anyhow!("cannot parse {value:?} as {}: {e}", stringify!($t)))?;
                Ok(())
            }
        }
    };
}

config_field!(String);
config_field!(bool);
config_field!(usize);

/// declares an option struct with per field defaults and doc strings used as descriptions
macro_rules! config_namespace {
    (
        $(#[doc=$struct_d:tt])*
        $vis:vis struct $struct_name: ident {
            $(
            $(#[doc=$d:tt])*
            $field_vis:vis $field_name:ident : $field_type: ty, default=$default:expr
            )*$(,)*
        }
    ) => {
        $(#[doc = $struct_d])*
        #[derive(Clone, Debug)]
        #[non_exhaustive]
        $vis struct $struct_name {
            $(
                $(#[doc=$d])*
                $field_vis $field_name: $field_type,
            )*
        }

        impl ConfigField for $struct_name {
            fn visit<V: Visit>(&self, v: &mut V, key_prefix: &str, _description: &'static str) {
                $(
                    let key = format!(concat!("{}.", stringify!($field_name)), key_prefix);
                    let desc = concat!($($d),*).trim();
                    self.$field_name.visit(v, key.as_str(), desc);
                )*
            }
            fn set(&mut self, key: &str, value: &str) -> Result<()> {
                let (key, remaining) = key.split_once('.').unwrap_or((key, ""));
                match key {
                    $(
                        stringify!($field_name) => self.$field_name.set(remaining, value),
                    )*
                    _=> Err(anyhow!("invalid config key {}", key))
                }
            }

        }
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field_name: $default),*
                }
            }
        }
    };
}

config_namespace! {
    pub struct NaOptions {
        /// default value of `how` for drop when the caller does not give one, "any" or "all"
        pub default_how: String, default = "any".to_string()

        /// emit a warning event for every replacement skipped on a type mismatch
        pub warn_on_skipped: bool, default = true
    }
}

config_namespace! {
    pub struct ExecutionOptions {
        /// maximum number of rows the local evaluator reads from a table scan
        pub max_rows: usize, default = 1_000_000
    }
}

#[derive(Debug)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub description: &'static str,
}

#[derive(Debug, Clone, Default)]
#[non_exhaustive]
pub struct ConfigOptions {
    pub na: NaOptions,
    pub execution: ExecutionOptions,
}

impl ConfigField for ConfigOptions {
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let (key, rem) = key.split_once('.').unwrap_or((key, ""));
        match key {
            "na" => self.na.set(rem, value),
            "execution" => self.execution.set(rem, value),
            _ => Err(anyhow!("unknown entry type for key {}", key)),
        }
    }
    fn visit<V: Visit>(&self, v: &mut V, _key_prefix: &str, _description: &'static str) {
        self.na.visit(v, "narewrite.na", "");
        self.execution.visit(v, "narewrite.execution", "");
    }
}

impl ConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }
    /// set an option by key, with or without the leading `narewrite.`
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let key = key.strip_prefix("narewrite.").unwrap_or(key);
        ConfigField::set(self, key, value)
    }
    pub fn entries(&self) -> Vec<ConfigEntry> {
        struct Visitor(Vec<ConfigEntry>);
        impl Visit for Visitor {
            fn some<V: Display>(&mut self, key: &str, value: V, description: &'static str) {
                self.0.push(ConfigEntry {
                    key: key.to_string(),
                    value: value.to_string(),
                    description,
                })
            }
        }
        let mut v = Visitor(vec![]);
        self.visit(&mut v, "narewrite", "");
        v.0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults_and_set() -> Result<()> {
        let mut config = ConfigOptions::new();
        assert_eq!(config.na.default_how, "any");
        assert!(config.na.warn_on_skipped);
        config.set("narewrite.na.default_how", "all")?;
        config.set("na.warn_on_skipped", "false")?;
        config.set("execution.max_rows", "10")?;
        assert_eq!(config.na.default_how, "all");
        assert!(!config.na.warn_on_skipped);
        assert_eq!(config.execution.max_rows, 10);
        assert!(config.set("na.no_such_key", "1").is_err());
        assert!(config.set("execution.max_rows", "many").is_err());
        Ok(())
    }

    #[test]
    fn test_entries() {
        let entries = ConfigOptions::new().entries();
        let keys = entries.iter().map(|e| e.key.as_str()).collect::<Vec<_>>();
        assert_eq!(
            keys,
            vec![
                "narewrite.na.default_how",
                "narewrite.na.warn_on_skipped",
                "narewrite.execution.max_rows"
            ]
        );
        assert_eq!(entries[2].value, "1000000");
        assert!(!entries[0].description.is_empty());
    }
}
