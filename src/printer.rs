use crate::env::Environment;
use crate::value::Sexp;

/// Renders a value back to source-ish text. Literals round-trip through the
/// parser; `#BUILTIN:` and `#PROC:` are debug forms and do not.
pub fn dump_sexp(sexp: &Sexp, env: &Environment) -> String {
    match sexp {
        Sexp::Nil => "()".to_owned(),
        // f64's Display is the shortest representation that round-trips
        Sexp::Number(n) => format!("{}", n),
        Sexp::Bool(true) => "#t".to_owned(),
        Sexp::Bool(false) => "#f".to_owned(),
        Sexp::String(s) => format!(r#""{}""#, s),
        Sexp::Symbol(s) => s.clone(),
        Sexp::Reference(_) => {
            let mut parts = vec![];
            let mut curr = sexp.clone();
            while let Sexp::Reference(loc) = curr {
                let cell = env.heap().cell(loc);
                parts.push(dump_sexp(&cell.car, env));
                curr = cell.cdr.clone();
            }
            format!("({})", parts.join(" "))
        }
        Sexp::Builtin { name, .. } => format!("#BUILTIN:{}", name),
        Sexp::Procedure(loc) => match &env.heap().user_proc(*loc).name {
            Some(name) => format!("#PROC:{}", name),
            None => "#PROC".to_owned(),
        },
    }
}
