//! Prototype string parsing.
//!
//! Method and callback declarations arrive as single-line C prototypes,
//! for example:
//!
//! ```text
//! int shmch_channel_request (ShmchChannel* self, guint8* data, int data_length1, GError** error)
//! ```
//!
//! The grammar is deliberately narrow: one return type, one name, one
//! flat comma-separated parameter list. Pointer stars may be spaced
//! freely (`guint8 *`, `guint8*`, `guint8 * data`, even `guint8 *data`);
//! they are folded onto the type during normalization so later stages
//! can match type spellings literally. Anything outside the grammar is
//! rejected, never guessed at: function-pointer parameters, variadics,
//! and default arguments all fail with a [`ParseError`].

use nodeglue_core::error::{ParseError, ParseErrorKind};
use nodeglue_core::signature::{Param, Signature, normalize_type};

/// Parse a single C prototype into a [`Signature`].
pub fn parse_prototype(text: &str) -> Result<Signature, ParseError> {
    let proto = text.trim();

    let (front, rest) = proto
        .split_once('(')
        .ok_or_else(|| ParseError::missing_parameter_list(proto))?;
    let (params_text, trailer) = rest
        .rsplit_once(')')
        .ok_or_else(|| ParseError::unterminated_parameter_list(proto))?;

    if !trailer.trim().is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::TrailingCharacters,
            proto,
            format!("unexpected `{}` after ')'", trailer.trim()),
        ));
    }
    if params_text.contains('(') {
        return Err(ParseError::new(
            ParseErrorKind::NestedParameterList,
            proto,
            "function-pointer parameters must be declared through a named callback type".to_string(),
        ));
    }

    let (return_type, name) = parse_declarator(proto, front)?;
    let params = parse_params(proto, params_text)?;

    Ok(Signature::new(return_type, name, params))
}

/// Split the text before `(` into a return type and a function name.
fn parse_declarator(proto: &str, front: &str) -> Result<(String, String), ParseError> {
    let front = front.trim();
    let (ret_text, name_text) = front
        .rsplit_once(char::is_whitespace)
        .ok_or_else(|| {
            ParseError::new(
                ParseErrorKind::MissingName,
                proto,
                "expected a return type followed by a function name".to_string(),
            )
        })?;

    let (ret_extra_stars, name) = split_leading_stars(name_text);
    if !is_identifier(name) {
        return Err(ParseError::new(
            ParseErrorKind::InvalidName,
            proto,
            format!("`{name}` is not a valid C identifier"),
        ));
    }

    let mut return_type = normalize_type(ret_text);
    if return_type.is_empty() {
        return Err(ParseError::new(
            ParseErrorKind::MissingName,
            proto,
            "expected a return type followed by a function name".to_string(),
        ));
    }
    for _ in 0..ret_extra_stars {
        return_type.push('*');
    }

    Ok((return_type, name.to_string()))
}

/// Parse the comma-separated parameter list. `()` and `(void)` both mean
/// an empty list.
fn parse_params(proto: &str, params_text: &str) -> Result<Vec<Param>, ParseError> {
    let trimmed = params_text.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return Ok(Vec::new());
    }

    let mut params = Vec::new();
    for piece in trimmed.split(',') {
        let piece = piece.trim();
        if piece.contains("...") {
            return Err(ParseError::new(
                ParseErrorKind::VariadicParameter,
                proto,
                "variadic parameters cannot be marshaled".to_string(),
            ));
        }
        if piece.contains('=') {
            return Err(ParseError::new(
                ParseErrorKind::DefaultArgument,
                proto,
                format!("default arguments are not part of the grammar: `{piece}`"),
            ));
        }

        let (ty_text, name_text) = piece
            .rsplit_once(char::is_whitespace)
            .ok_or_else(|| ParseError::invalid_parameter(proto, piece))?;

        let (extra_stars, name) = split_leading_stars(name_text);
        if !is_identifier(name) {
            return Err(ParseError::invalid_parameter(proto, piece));
        }

        let mut ty = normalize_type(ty_text);
        if ty.is_empty() {
            return Err(ParseError::invalid_parameter(proto, piece));
        }
        for _ in 0..extra_stars {
            ty.push('*');
        }

        params.push(Param::new(ty, name));
    }

    Ok(params)
}

/// Peel leading `*` characters off a name token. They belong to the type
/// (`char *a` declares `a` of type `char*`).
fn split_leading_stars(name: &str) -> (usize, &str) {
    let stars = name.chars().take_while(|&c| c == '*').count();
    (stars, &name[stars..])
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_method_with_receiver_and_sentinel() {
        let sig = parse_prototype(
            "int shmch_channel_request (ShmchChannel* self, guint8* data, int data_length1, GError** error)",
        )
        .unwrap();
        assert_eq!(sig.return_type, "int");
        assert_eq!(sig.name, "shmch_channel_request");
        assert_eq!(sig.param_count(), 4);
        assert_eq!(sig.params[0], Param::new("ShmchChannel*", "self"));
        assert_eq!(sig.params[3], Param::new("GError**", "error"));
        assert!(sig.has_error_sentinel());
    }

    #[test]
    fn normalizes_spaced_stars() {
        let sig = parse_prototype(
            "void shmch_data_callback (guint8 * data, int data_length1, void * user_data)",
        )
        .unwrap();
        assert_eq!(sig.params[0].ty, "guint8*");
        assert_eq!(sig.params[2].ty, "void*");
    }

    #[test]
    fn folds_stars_attached_to_names() {
        let sig = parse_prototype("void f (char *a, GError **error)").unwrap();
        assert_eq!(sig.params[0], Param::new("char*", "a"));
        assert_eq!(sig.params[1], Param::new("GError**", "error"));
    }

    #[test]
    fn multiword_return_type() {
        let sig = parse_prototype("const gchar * shmch_channel_get_name (ShmchChannel* self)").unwrap();
        assert_eq!(sig.return_type, "const gchar*");
        assert_eq!(sig.name, "shmch_channel_get_name");
    }

    #[test]
    fn star_attached_to_function_name() {
        let sig = parse_prototype("const gchar *shmch_channel_get_name (ShmchChannel* self)").unwrap();
        assert_eq!(sig.return_type, "const gchar*");
        assert_eq!(sig.name, "shmch_channel_get_name");
    }

    #[test]
    fn empty_parameter_lists() {
        assert!(parse_prototype("void tick ()").unwrap().params.is_empty());
        assert!(parse_prototype("void tick (void)").unwrap().params.is_empty());
    }

    #[test]
    fn rejects_missing_parameter_list() {
        let err = parse_prototype("void shmch_channel_close").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingParameterList);
    }

    #[test]
    fn rejects_unterminated_parameter_list() {
        let err = parse_prototype("void f (int a").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedParameterList);
    }

    #[test]
    fn rejects_trailing_characters() {
        let err = parse_prototype("void f (int a) const").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::TrailingCharacters);
    }

    #[test]
    fn rejects_function_pointer_parameters() {
        let err = parse_prototype("void f (void (*cb)(int x), void* user_data)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::NestedParameterList);
    }

    #[test]
    fn rejects_variadics() {
        let err = parse_prototype("void log_all (const gchar* fmt, ...)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::VariadicParameter);
    }

    #[test]
    fn rejects_default_arguments() {
        let err = parse_prototype("void f (int a = 1)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DefaultArgument);
    }

    #[test]
    fn rejects_parameter_without_name() {
        let err = parse_prototype("void f (int)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidParameter);
        assert!(err.message.contains("`int`"));
    }

    #[test]
    fn rejects_missing_function_name() {
        let err = parse_prototype("shmch_channel_close (ShmchChannel* self)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::MissingName);
    }

    #[test]
    fn rejects_non_identifier_name() {
        let err = parse_prototype("void 9lives (int a)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidName);
    }

    #[test]
    fn error_display_carries_the_prototype() {
        let err = parse_prototype("void f (int a) junk").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("void f (int a) junk"));
        assert!(text.contains("trailing characters"));
    }
}
