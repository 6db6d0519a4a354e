//! The `%v` pattern engine.
//!
//! `%v` is the sole positional placeholder; `%%` writes a literal percent.
//! Arguments arrive as a tagged variant list ([`Arg`]) built by `From`
//! conversions, so a call site passes `&[7.into(), "x".into()]` and no
//! argument ever allocates on its own. User types plug in through the
//! [`Arg::Display`] hook.
//!
//! Formatting never fails: a `%v` with no remaining argument folds a
//! visible `%!v` marker into the line, a stray `%` is written literally.

use std::fmt;
use std::io::Write;

/// One formatting argument.
#[derive(Clone, Copy)]
pub enum Arg<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
    Bool(bool),
    Char(char),
    /// Escape hatch for user types; stringified via their `Display` impl.
    Display(&'a dyn fmt::Display),
}

macro_rules! arg_from {
    ($variant:ident, $via:ty, $($t:ty),+) => {
        $(impl<'a> From<$t> for Arg<'a> {
            #[inline]
            fn from(v: $t) -> Self {
                Arg::$variant(v as $via)
            }
        })+
    };
}

arg_from!(Int, i64, i8, i16, i32, i64, isize);
arg_from!(Uint, u64, u8, u16, u32, u64, usize);
arg_from!(Float, f64, f32, f64);

impl<'a> From<&'a str> for Arg<'a> {
    #[inline]
    fn from(v: &'a str) -> Self {
        Arg::Str(v)
    }
}

impl<'a> From<&'a String> for Arg<'a> {
    #[inline]
    fn from(v: &'a String) -> Self {
        Arg::Str(v)
    }
}

impl<'a> From<bool> for Arg<'a> {
    #[inline]
    fn from(v: bool) -> Self {
        Arg::Bool(v)
    }
}

impl<'a> From<char> for Arg<'a> {
    #[inline]
    fn from(v: char) -> Self {
        Arg::Char(v)
    }
}

impl fmt::Debug for Arg<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Int(v) => write!(f, "Int({v})"),
            Arg::Uint(v) => write!(f, "Uint({v})"),
            Arg::Float(v) => write!(f, "Float({v})"),
            Arg::Str(v) => write!(f, "Str({v:?})"),
            Arg::Bool(v) => write!(f, "Bool({v})"),
            Arg::Char(v) => write!(f, "Char({v:?})"),
            Arg::Display(v) => write!(f, "Display({v})"),
        }
    }
}

fn push_arg(out: &mut Vec<u8>, arg: &Arg<'_>) {
    // Writes to a Vec cannot fail.
    let _ = match arg {
        Arg::Int(v) => write!(out, "{v}"),
        Arg::Uint(v) => write!(out, "{v}"),
        Arg::Float(v) => write!(out, "{v}"),
        Arg::Str(v) => {
            out.extend_from_slice(v.as_bytes());
            Ok(())
        }
        Arg::Bool(v) => write!(out, "{v}"),
        Arg::Char(v) => write!(out, "{v}"),
        Arg::Display(v) => write!(out, "{v}"),
    };
}

/// Expands `fmt` into `out`, consuming arguments left to right.
///
/// Surplus arguments are ignored; missing ones render as `%!v`.
pub fn format_into(out: &mut Vec<u8>, fmt: &str, args: &[Arg<'_>]) {
    let bytes = fmt.as_bytes();
    let mut next_arg = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'%' {
            out.push(b);
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'v') => {
                match args.get(next_arg) {
                    Some(arg) => push_arg(out, arg),
                    None => out.extend_from_slice(b"%!v"),
                }
                next_arg += 1;
                i += 2;
            }
            Some(b'%') => {
                out.push(b'%');
                i += 2;
            }
            _ => {
                // Stray percent: keep it as-is.
                out.push(b'%');
                i += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(fmt: &str, args: &[Arg<'_>]) -> String {
        let mut out = Vec::new();
        format_into(&mut out, fmt, args);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn substitutes_in_order() {
        assert_eq!(
            render("%v + %v = %v", &[1.into(), 2.into(), 3.into()]),
            "1 + 2 = 3"
        );
    }

    #[test]
    fn all_variants_render() {
        assert_eq!(render("%v", &[(-7i32).into()]), "-7");
        assert_eq!(render("%v", &[7u64.into()]), "7");
        assert_eq!(render("%v", &[2.5f64.into()]), "2.5");
        assert_eq!(render("%v", &["abc".into()]), "abc");
        assert_eq!(render("%v", &[true.into()]), "true");
        assert_eq!(render("%v", &['x'.into()]), "x");
    }

    #[test]
    fn display_hook_renders_user_types() {
        struct Point(i32, i32);
        impl std::fmt::Display for Point {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "({},{})", self.0, self.1)
            }
        }
        let p = Point(3, 4);
        assert_eq!(render("at %v", &[Arg::Display(&p)]), "at (3,4)");
    }

    #[test]
    fn percent_escapes() {
        assert_eq!(render("100%%", &[]), "100%");
        assert_eq!(render("%v%%", &[50.into()]), "50%");
    }

    #[test]
    fn stray_percent_is_literal() {
        assert_eq!(render("50% off", &[]), "50% off");
        assert_eq!(render("tail%", &[]), "tail%");
    }

    #[test]
    fn missing_argument_folds_marker() {
        assert_eq!(render("a=%v b=%v", &["x".into()]), "a=x b=%!v");
    }

    #[test]
    fn surplus_arguments_ignored() {
        assert_eq!(render("just %v", &[1.into(), 2.into()]), "just 1");
    }
}
