/// Write `ident` double-quoted, one quoted segment per dot-separated part.
///
/// Embedded `"` are doubled. A segment that already arrives wrapped in quotes is not
/// wrapped twice, and pre-escaped `""` pairs pass through as a pair, so
/// `schema.table`, `"schema"."table"` and `"my""col"` all come out valid.
pub fn quote_to(writer: &mut String, ident: &str) {
    let mut under_quoted = false;
    let mut self_quoted = false;
    let mut continuous_quotes: isize = 0;
    let mut shift_delimiter: isize = 0;

    for ch in ident.chars() {
        match ch {
            '"' => {
                continuous_quotes += 1;
                if continuous_quotes == 2 {
                    writer.push_str("\"\"");
                    continuous_quotes = 0;
                }
            }
            '.' => {
                if continuous_quotes > 0 || !self_quoted {
                    shift_delimiter = 0;
                    under_quoted = false;
                    continuous_quotes = 0;
                    writer.push('"');
                }
                writer.push('.');
                continue;
            }
            _ => {
                if shift_delimiter - continuous_quotes <= 0 && !under_quoted {
                    writer.push('"');
                    under_quoted = true;
                    self_quoted = continuous_quotes > 0;
                    if self_quoted {
                        continuous_quotes -= 1;
                    }
                }

                while continuous_quotes > 0 {
                    writer.push_str("\"\"");
                    continuous_quotes -= 1;
                }

                writer.push(ch);
            }
        }
        shift_delimiter += 1;
    }

    if continuous_quotes > 0 && !self_quoted {
        writer.push_str("\"\"");
    }
    writer.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quoted(ident: &str) -> String {
        let mut out = String::new();
        quote_to(&mut out, ident);
        out
    }

    #[test]
    fn plain_identifier() {
        assert_eq!(quoted("a"), "\"a\"");
        assert_eq!(quoted("users"), "\"users\"");
    }

    #[test]
    fn dotted_identifier_quotes_each_segment() {
        assert_eq!(quoted("a.b"), "\"a\".\"b\"");
        assert_eq!(quoted("public.users.id"), "\"public\".\"users\".\"id\"");
    }

    #[test]
    fn embedded_quote_is_doubled() {
        assert_eq!(quoted("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn already_quoted_segments_are_kept() {
        assert_eq!(quoted("\"a\""), "\"a\"");
        assert_eq!(quoted("\"a\".\"b\""), "\"a\".\"b\"");
        assert_eq!(quoted("\"x\".y"), "\"x\".\"y\"");
    }

    #[test]
    fn escaped_pair_passes_through() {
        assert_eq!(quoted("my\"\"col"), "\"my\"\"col\"");
    }

    #[test]
    fn non_ascii_identifier() {
        assert_eq!(quoted("用户.名字"), "\"用户\".\"名字\"");
    }
}
