use crate::env::Environment;
use crate::expect;
use crate::util::{LispError, Result};
use crate::value::{cons, list_from_vec, Sexp};

/// Reserved symbols the reader expands prefix syntax into.
pub(crate) const SYM_QUOTE: &str = "quote";
pub(crate) const SYM_QUASIQUOTE: &str = "quasiquote";
pub(crate) const SYM_UNQUOTE: &str = "unquote";

/// One open parenthesis being accumulated, plus the prefix wrapper (if any)
/// that was pending when it opened.
struct ParseFrame {
    children: Vec<Sexp>,
    wrapper: Option<&'static str>,
}

impl ParseFrame {
    fn new() -> Self {
        ParseFrame {
            children: vec![],
            wrapper: None,
        }
    }
}

/// Wraps `form` into the two-element list `(<sym> <form>)`.
fn wrap_form(sym: &'static str, form: Sexp, env: &mut Environment) -> Sexp {
    let tail = cons(form, Sexp::Nil, env);
    cons(Sexp::symbol(sym), tail, env)
}

fn push_form(
    stack: &mut Vec<ParseFrame>,
    pending_wrap: &mut Option<&'static str>,
    form: Sexp,
    env: &mut Environment,
) {
    let form = match pending_wrap.take() {
        Some(sym) => wrap_form(sym, form, env),
        None => form,
    };
    let Some(top) = stack.last_mut() else {
        unreachable!()
    };
    top.children.push(form);
}

/// Reads a source unit into an ordered sequence of top-level forms. A
/// single left-to-right scan with no backtracking; all list structure is
/// allocated directly into the runtime arena, so parsed code and runtime
/// data share one representation.
pub fn parse(src: &str, env: &mut Environment) -> Result<Vec<Sexp>> {
    let chars: Vec<char> = src.chars().collect();
    let mut stack = vec![ParseFrame::new()];
    let mut pending_wrap: Option<&'static str> = None;
    let mut cursor = 0;

    while cursor < chars.len() {
        let c = chars[cursor];

        if c.is_whitespace() {
            cursor += 1;
            continue;
        }

        // comments run to end of line
        if c == ';' {
            while cursor < chars.len() && chars[cursor] != '\n' {
                cursor += 1;
            }
            continue;
        }

        if let Some(sym) = match c {
            '\'' => Some(SYM_QUOTE),
            '`' => Some(SYM_QUASIQUOTE),
            ',' => Some(SYM_UNQUOTE),
            _ => None,
        } {
            pending_wrap = Some(sym);
            cursor += 1;
            continue;
        }

        if c == '(' {
            let mut frame = ParseFrame::new();
            frame.wrapper = pending_wrap.take();
            stack.push(frame);
            cursor += 1;
            continue;
        }

        if c == ')' {
            if let Some(sym) = pending_wrap {
                return Err(LispError::MissingQuotedForm(sym));
            }
            if stack.len() == 1 {
                return Err(LispError::UnbalancedParen);
            }
            let Some(frame) = stack.pop() else {
                unreachable!()
            };
            let mut list = list_from_vec(frame.children, env);
            if let Some(sym) = frame.wrapper {
                list = wrap_form(sym, list, env);
            }
            let Some(parent) = stack.last_mut() else {
                unreachable!()
            };
            parent.children.push(list);
            cursor += 1;
            continue;
        }

        if c == '"' {
            cursor += 1;
            let (s, rest) = read_string(&chars, cursor)?;
            cursor = rest;
            push_form(&mut stack, &mut pending_wrap, Sexp::String(s), env);
            continue;
        }

        if c == '#' {
            let form = match chars.get(cursor + 1) {
                Some('t') => Sexp::Bool(true),
                Some('f') => Sexp::Bool(false),
                // reserved for keyword arguments
                Some(':') => return Err(LispError::ReservedSyntax("#:")),
                _ => return Err(LispError::InvalidHashLiteral),
            };
            cursor += 2;
            push_form(&mut stack, &mut pending_wrap, form, env);
            continue;
        }

        let (form, rest) = read_token(&chars, cursor)?;
        cursor = rest;
        push_form(&mut stack, &mut pending_wrap, form, env);
    }

    if let Some(sym) = pending_wrap {
        return Err(LispError::MissingQuotedForm(sym));
    }
    expect!(stack.len() == 1, LispError::UnbalancedParen);
    let Some(top) = stack.pop() else { unreachable!() };
    Ok(top.children)
}

/// Reads the remainder of a `"`-delimited string literal, decoding escapes.
/// Returns the string and the cursor past the closing quote.
fn read_string(chars: &[char], mut cursor: usize) -> Result<(String, usize)> {
    let mut s = String::new();
    loop {
        match chars.get(cursor) {
            None => return Err(LispError::UnterminatedString),
            Some('"') => return Ok((s, cursor + 1)),
            Some('\\') => {
                match chars.get(cursor + 1) {
                    None => return Err(LispError::UnterminatedString),
                    Some('n') => s.push('\n'),
                    Some('t') => s.push('\t'),
                    Some('"') => s.push('"'),
                    Some('\\') => s.push('\\'),
                    Some(c) => return Err(LispError::InvalidEscape(*c)),
                }
                cursor += 2;
            }
            Some(c) => {
                s.push(*c);
                cursor += 1;
            }
        }
    }
}

/// Reads a bare token, delimited by whitespace or parentheses. The token is
/// first attempted as a floating-point literal and otherwise becomes a
/// symbol.
fn read_token(chars: &[char], mut cursor: usize) -> Result<(Sexp, usize)> {
    let start = cursor;
    while cursor < chars.len() {
        let c = chars[cursor];
        if c.is_whitespace() || c == '(' || c == ')' {
            break;
        }
        cursor += 1;
    }
    let token: String = chars[start..cursor].iter().collect();

    match token.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok((Sexp::from(v), cursor)),
        // `parse` also accepts the named literals `inf`/`nan`; those stay
        // symbols, and only a digit-shaped token can be out of range
        Ok(_) if token.contains(|c: char| c.is_ascii_digit()) => {
            Err(LispError::NumberOutOfRange)
        }
        _ => Ok((Sexp::Symbol(token), cursor)),
    }
}
