use crate::builtins;
use crate::env::Environment;
use crate::expect;
use crate::heap::ProcLocation;
use crate::util::{LispError, Result};
use crate::value::{list_to_vec, Sexp};

/// Evaluates one form against the environment.
///
/// Literals evaluate to themselves; symbols resolve through the scope chain
/// and then the builtin table; a cons form applies its operator to the raw,
/// unevaluated argument list. Handing every operator its arguments
/// unevaluated is what lets special forms like `if` and `quote` control
/// evaluation themselves; ordinary procedures simply evaluate each argument
/// before use.
pub fn eval(form: &Sexp, env: &mut Environment) -> Result<Sexp> {
    match form {
        Sexp::Symbol(name) => {
            if let Some(val) = env.lookup_binding(name) {
                Ok(val)
            } else if let Some(builtin) = builtins::lookup(name) {
                Ok(builtin)
            } else {
                Err(LispError::UndefinedVariable(name.clone()))
            }
        }
        Sexp::Reference(loc) => {
            let cell = env.heap().cell(*loc);
            let (operator, raw_args) = (cell.car.clone(), cell.cdr.clone());
            let Sexp::Symbol(name) = &operator else {
                return Err(LispError::InvalidDataType("symbol", operator.type_of()));
            };
            match env.lookup_binding(name) {
                Some(Sexp::Procedure(proc)) => apply_user_proc(proc, &raw_args, env),
                Some(Sexp::Builtin { f, .. }) => f(&raw_args, env),
                Some(_) => Err(LispError::ProcedureNotFound(name.clone())),
                None => match builtins::lookup_fn(name) {
                    Some(f) => f(&raw_args, env),
                    None => Err(LispError::ProcedureNotFound(name.clone())),
                },
            }
        }
        _ => Ok(form.clone()),
    }
}

/// Calls a user procedure: arguments are evaluated in the caller's scope,
/// then a fresh frame is chained under the procedure's *captured* frame
/// (lexical, not dynamic, scoping) and the body forms run in sequence. The
/// last body form's value is the call's result.
fn apply_user_proc(
    proc: ProcLocation,
    raw_args: &Sexp,
    env: &mut Environment,
) -> Result<Sexp> {
    let arg_forms = list_to_vec(raw_args, env)?;
    let mut arg_values = Vec::with_capacity(arg_forms.len());
    for form in &arg_forms {
        arg_values.push(eval(form, env)?);
    }

    let record = env.heap().user_proc(proc);
    let params = record.params.clone();
    let body = Sexp::Reference(record.body);
    let closure = record.closure;
    expect!(
        arg_values.len() == params.len(),
        LispError::IncorrectArguments(params.len(), arg_values.len())
    );

    let frame = env.alloc_frame(closure);
    for (param, value) in params.into_iter().zip(arg_values) {
        env.heap_mut().frame_mut(frame).bindings.insert(param, value);
    }
    let body_forms = list_to_vec(&body, env)?;

    // the previous scope must come back on every exit path, including errors
    let prev = env.swap_scope(frame);
    let mut result = Ok(Sexp::Nil);
    for form in &body_forms {
        result = eval(form, env);
        if result.is_err() {
            break;
        }
    }
    env.swap_scope(prev);
    result
}
