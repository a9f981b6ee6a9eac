use itertools::Itertools;
use phf::phf_map;

use crate::env::Environment;
use crate::eval::eval;
use crate::expect;
use crate::heap::UserProc;
use crate::util::{LispError, Result};
use crate::value::{
    car, cdr, cons, list_exact, list_prefix, list_to_vec, BuiltinFn, Sexp,
};

fn eval_args(raw_args: &Sexp, env: &mut Environment) -> Result<Vec<Sexp>> {
    let forms = list_to_vec(raw_args, env)?;
    forms.iter().map(|form| eval(form, env)).collect()
}

fn eval_args_to_numbers(
    raw_args: &Sexp,
    env: &mut Environment,
    op: &'static str,
) -> Result<Vec<f64>> {
    eval_args(raw_args, env)?
        .into_iter()
        .map(|val| match val {
            Sexp::Number(n) => Ok(n.0),
            other => Err(LispError::NonNumericArgument(op, other.type_of())),
        })
        .collect()
}

fn lisp_add(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let nums = eval_args_to_numbers(raw_args, env, "+")?;
    Ok(nums.iter().fold(0.0, |acc, x| acc + x).into())
}

fn lisp_mul(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let nums = eval_args_to_numbers(raw_args, env, "*")?;
    Ok(nums.iter().fold(1.0, |acc, x| acc * x).into())
}

fn lisp_sub(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let nums = eval_args_to_numbers(raw_args, env, "-")?;
    expect!(!nums.is_empty(), LispError::IncorrectArguments(1, 0));
    if nums.len() == 1 {
        // unary negation
        Ok((-nums[0]).into())
    } else {
        Ok(nums[1..].iter().fold(nums[0], |acc, x| acc - x).into())
    }
}

fn lisp_div(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let nums = eval_args_to_numbers(raw_args, env, "/")?;
    expect!(!nums.is_empty(), LispError::IncorrectArguments(1, 0));
    Ok(nums[1..].iter().fold(nums[0], |acc, x| acc / x).into())
}

fn lisp_sqrt(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [form] = list_exact::<1>(raw_args, env)?;
    match eval(&form, env)? {
        Sexp::Number(n) => Ok(n.0.sqrt().into()),
        other => Err(LispError::NonNumericArgument("sqrt", other.type_of())),
    }
}

/// Exactly one branch is evaluated. The condition counts as true only when
/// it evaluates to the boolean `#t`; every other value is false.
fn lisp_if(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [cond, then_case, else_case] = list_exact::<3>(raw_args, env)?;
    if eval(&cond, env)? == Sexp::Bool(true) {
        eval(&then_case, env)
    } else {
        eval(&else_case, env)
    }
}

fn lisp_eq(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let vals = eval_args(raw_args, env)?;
    Ok(Sexp::Bool(vals.iter().tuple_windows().all(|(a, b)| a == b)))
}

fn fold_compare(
    raw_args: &Sexp,
    env: &mut Environment,
    op: &'static str,
    cmp: fn(f64, f64) -> bool,
) -> Result<Sexp> {
    let nums = eval_args_to_numbers(raw_args, env, op)?;
    Ok(Sexp::Bool(
        nums.iter().tuple_windows().all(|(a, b)| cmp(*a, *b)),
    ))
}

fn lisp_lt(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    fold_compare(raw_args, env, "<", |a, b| a < b)
}

fn lisp_le(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    fold_compare(raw_args, env, "<=", |a, b| a <= b)
}

fn lisp_gt(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    fold_compare(raw_args, env, ">", |a, b| a > b)
}

fn lisp_ge(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    fold_compare(raw_args, env, ">=", |a, b| a >= b)
}

fn lisp_car(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [form] = list_exact::<1>(raw_args, env)?;
    let val = eval(&form, env)?;
    car(&val, env)
}

fn lisp_cdr(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [form] = list_exact::<1>(raw_args, env)?;
    let val = eval(&form, env)?;
    cdr(&val, env)
}

fn lisp_cons(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [car_form, cdr_form] = list_exact::<2>(raw_args, env)?;
    let car_val = eval(&car_form, env)?;
    let cdr_val = eval(&cdr_form, env)?;
    Ok(cons(car_val, cdr_val, env))
}

fn lisp_nullq(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [form] = list_exact::<1>(raw_args, env)?;
    Ok(Sexp::Bool(eval(&form, env)?.is_nil()))
}

fn lisp_quote(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [form] = list_exact::<1>(raw_args, env)?;
    Ok(form)
}

/// Builds a closure over the current frame. `params_decl` must be a list of
/// symbols; `body_decl` must be a non-empty list of forms.
fn make_user_proc(
    special: &'static str,
    name: Option<String>,
    params_decl: &Sexp,
    body_decl: &Sexp,
    env: &mut Environment,
) -> Result<Sexp> {
    let mut params = vec![];
    for param in list_to_vec(params_decl, env)? {
        let Sexp::Symbol(s) = &param else {
            return Err(LispError::InvalidDataType("symbol", param.type_of()));
        };
        params.push(s.clone());
    }
    let Sexp::Reference(body) = body_decl else {
        return Err(LispError::BadSpecialForm(special));
    };
    let closure = env.curr_scope();
    let proc = env.heap_mut().alloc_proc(UserProc {
        name,
        params,
        body: *body,
        closure,
    });
    Ok(Sexp::Procedure(proc))
}

/// `(define name expr)` or `(define (name param…) body…)`. Both bind into
/// the current frame only, shadowing any outer binding of the same name.
fn lisp_define(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let ([decl], rest) = list_prefix::<1>(raw_args, env)?;
    match decl {
        Sexp::Symbol(name) => {
            let [expr] = list_exact::<1>(&rest, env)?;
            let value = eval(&expr, env)?;
            if let Sexp::Procedure(proc) = &value {
                // name an anonymous procedure after its binding
                let record = env.heap_mut().user_proc_mut(*proc);
                if record.name.is_none() {
                    record.name = Some(name.clone());
                }
            }
            env.define_binding(name, value.clone());
            Ok(value)
        }
        Sexp::Reference(signature) => {
            let cell = env.heap().cell(signature);
            let (name_form, params) = (cell.car.clone(), cell.cdr.clone());
            let Sexp::Symbol(name) = name_form else {
                return Err(LispError::BadSpecialForm("define"));
            };
            let proc = make_user_proc("define", Some(name.clone()), &params, &rest, env)?;
            env.define_binding(name, proc.clone());
            Ok(proc)
        }
        _ => Err(LispError::BadSpecialForm("define")),
    }
}

/// `(lambda (param…) body…)`; closes over the current frame, binds nothing.
fn lisp_lambda(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let ([params], body) = list_prefix::<1>(raw_args, env)?;
    make_user_proc("lambda", None, &params, &body, env)
}

/// `(set! name expr)`; mutates the nearest enclosing frame binding `name`.
fn lisp_set(raw_args: &Sexp, env: &mut Environment) -> Result<Sexp> {
    let [name_form, expr] = list_exact::<2>(raw_args, env)?;
    let Sexp::Symbol(name) = name_form else {
        return Err(LispError::BadSpecialForm("set!"));
    };
    let value = eval(&expr, env)?;
    env.set_binding(&name, value.clone())?;
    Ok(value)
}

/// The builtin table. Every entry receives its raw, unevaluated argument
/// list; there is no dispatcher-level distinction between special forms and
/// ordinary procedures.
static BUILTINS: phf::Map<&'static str, BuiltinFn> = phf_map! {
    "+" => lisp_add,
    "-" => lisp_sub,
    "*" => lisp_mul,
    "/" => lisp_div,
    "sqrt" => lisp_sqrt,
    "if" => lisp_if,
    "=" => lisp_eq,
    "<" => lisp_lt,
    "<=" => lisp_le,
    ">" => lisp_gt,
    ">=" => lisp_ge,
    "car" => lisp_car,
    "cdr" => lisp_cdr,
    "cons" => lisp_cons,
    "null?" => lisp_nullq,
    "quote" => lisp_quote,
    "define" => lisp_define,
    "lambda" => lisp_lambda,
    "set!" => lisp_set,
};

/// Resolves a name to a builtin value, for symbols that reach evaluation
/// without a scope-chain binding.
pub(crate) fn lookup(name: &str) -> Option<Sexp> {
    BUILTINS
        .get_entry(name)
        .map(|(name, f)| Sexp::Builtin { name: *name, f: *f })
}

pub(crate) fn lookup_fn(name: &str) -> Option<BuiltinFn> {
    BUILTINS.get(name).copied()
}
