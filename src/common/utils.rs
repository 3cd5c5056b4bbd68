use anyhow::Result;
use sqlparser::ast::Ident;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

pub(crate) fn parse_identifiers(s: &str) -> Result<Vec<Ident>> {
    let dialect = GenericDialect;
    let mut parser = Parser::new(&dialect).try_with_sql(s)?;
    let idents = parser.parse_multipart_identifier()?;
    Ok(idents)
}

/// the content of `s` if it is a single well formed double quoted
/// identifier, with the doubled inner quotes unescaped
fn unquote_identifier(s: &str) -> Option<String> {
    let inner = s.strip_prefix('"')?.strip_suffix('"')?;
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '"' {
            // a lone quote inside means this is not a single identifier
            if chars.next() != Some('"') {
                return None;
            }
        }
        value.push(c);
    }
    Some(value)
}

fn quote_identifier(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// canonical form of a column name: always double quoted.
/// quoted input keeps its case, a plain identifier is folded to lower case,
/// anything else (spaces, dots, ...) is quoted verbatim.
/// applying it to an already canonical name is a no-op.
pub fn canonicalize(name: &str) -> String {
    if let Some(value) = unquote_identifier(name) {
        return quote_identifier(&value);
    }
    match parse_identifiers(name) {
        Ok(idents) if idents.len() == 1 && idents[0].quote_style.is_none() => {
            quote_identifier(&idents[0].value.to_ascii_lowercase())
        }
        _ => quote_identifier(name),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_canonicalize() {
        assert_eq!(canonicalize("a"), "\"a\"");
        assert_eq!(canonicalize("Name"), "\"name\"");
        assert_eq!(canonicalize("\"Name\""), "\"Name\"");
        assert_eq!(canonicalize("my col"), "\"my col\"");
        assert_eq!(canonicalize("a\"b\""), "\"a\"\"b\"\"\"");
    }

    #[test]
    fn test_canonicalize_idempotent() {
        for name in ["a", "Name", "\"Name\"", "my col", "t.c", "a\"b\"", "\"x\"\"y\""] {
            let once = canonicalize(name);
            assert_eq!(canonicalize(&once), once, "input {name}");
        }
    }
}
