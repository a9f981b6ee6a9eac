use ordered_float::OrderedFloat;

use crate::env::Environment;
use crate::expect;
use crate::heap::{MemoryLocation, ProcLocation};
use crate::util::{LispError, Result};

pub type BuiltinFn = fn(&Sexp, &mut Environment) -> Result<Sexp>;

/// The universal tagged value: every piece of source code and every runtime
/// datum is a `Sexp`. Values are small and cheap to clone; anything shared
/// or mutable lives in the arena behind a `Reference` or `Procedure` handle.
#[derive(Clone, Debug)]
pub enum Sexp {
    Nil,
    Number(OrderedFloat<f64>),
    Bool(bool),
    String(String),
    Symbol(String),
    Reference(MemoryLocation),
    Builtin { name: &'static str, f: BuiltinFn },
    Procedure(ProcLocation),
}

impl Sexp {
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Reference(_) => "cons",
            Self::Builtin { .. } => "procedure",
            Self::Procedure(_) => "procedure",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }
}

impl From<f64> for Sexp {
    fn from(item: f64) -> Self {
        Self::Number(OrderedFloat(item))
    }
}
impl From<OrderedFloat<f64>> for Sexp {
    fn from(item: OrderedFloat<f64>) -> Self {
        Self::Number(item)
    }
}
impl From<bool> for Sexp {
    fn from(item: bool) -> Self {
        Self::Bool(item)
    }
}
impl From<String> for Sexp {
    fn from(item: String) -> Self {
        Self::String(item)
    }
}

/// Structural for primitives, by name for symbols and builtins, by handle
/// identity for references and user procedures. Mismatched tags never
/// compare equal.
impl std::cmp::PartialEq for Sexp {
    fn eq(&self, other: &Sexp) -> bool {
        match (self, other) {
            (Sexp::Nil, Sexp::Nil) => true,
            (Sexp::Number(a), Sexp::Number(b)) => a == b,
            (Sexp::Bool(a), Sexp::Bool(b)) => a == b,
            (Sexp::String(a), Sexp::String(b)) => a == b,
            (Sexp::Symbol(a), Sexp::Symbol(b)) => a == b,
            (Sexp::Reference(a), Sexp::Reference(b)) => a == b,
            (Sexp::Builtin { name: a, .. }, Sexp::Builtin { name: b, .. }) => a == b,
            (Sexp::Procedure(a), Sexp::Procedure(b)) => a == b,
            _ => false,
        }
    }
}
impl std::cmp::Eq for Sexp {}

/// Allocates a fresh cell; the canonical way new list structure comes into
/// being at runtime.
pub fn cons(car: Sexp, cdr: Sexp, env: &mut Environment) -> Sexp {
    Sexp::Reference(env.heap_mut().alloc_cell(car, cdr))
}

pub fn car(sexp: &Sexp, env: &Environment) -> Result<Sexp> {
    match sexp {
        Sexp::Reference(loc) => Ok(env.heap().cell(*loc).car.clone()),
        _ => Err(LispError::InvalidDataType("cons", sexp.type_of())),
    }
}

pub fn cdr(sexp: &Sexp, env: &Environment) -> Result<Sexp> {
    match sexp {
        Sexp::Reference(loc) => Ok(env.heap().cell(*loc).cdr.clone()),
        _ => Err(LispError::InvalidDataType("cons", sexp.type_of())),
    }
}

/// Folds a slice right-to-left into a Nil-terminated cons chain, preserving
/// element order.
pub fn list_from_vec(items: Vec<Sexp>, env: &mut Environment) -> Sexp {
    let mut list = Sexp::Nil;
    for item in items.into_iter().rev() {
        list = cons(item, list, env);
    }
    list
}

/// Collects a proper list into a `Vec`. A tail that is neither `Nil` nor
/// another cell is a type error.
pub fn list_to_vec(list: &Sexp, env: &Environment) -> Result<Vec<Sexp>> {
    let mut out = vec![];
    let mut curr = list.clone();
    loop {
        match curr {
            Sexp::Nil => return Ok(out),
            Sexp::Reference(loc) => {
                let cell = env.heap().cell(loc);
                out.push(cell.car.clone());
                curr = cell.cdr.clone();
            }
            other => return Err(LispError::InvalidDataType("list", other.type_of())),
        }
    }
}

/// Number of cells in the list's spine. Counts up to the first non-cell
/// tail, so it is total even on malformed input.
pub fn list_len(list: &Sexp, env: &Environment) -> usize {
    let mut len = 0;
    let mut curr = list.clone();
    while let Sexp::Reference(loc) = curr {
        len += 1;
        curr = env.heap().cell(loc).cdr.clone();
    }
    len
}

/// Binds the first `N` elements of a cons list and returns them together
/// with the remaining tail. Errors if the list holds fewer than `N`
/// elements. This is the uniform mechanism every builtin uses to pick apart
/// its raw argument list.
pub fn list_prefix<const N: usize>(list: &Sexp, env: &Environment) -> Result<([Sexp; N], Sexp)> {
    let mut taken = Vec::with_capacity(N);
    let mut curr = list.clone();
    while taken.len() < N {
        let Sexp::Reference(loc) = curr else {
            return Err(LispError::IncorrectArguments(N, taken.len()));
        };
        let cell = env.heap().cell(loc);
        taken.push(cell.car.clone());
        curr = cell.cdr.clone();
    }
    let Ok(prefix) = <[Sexp; N]>::try_from(taken) else {
        unreachable!()
    };
    Ok((prefix, curr))
}

/// Like [`list_prefix`], but requires the list to be exactly exhausted.
pub fn list_exact<const N: usize>(list: &Sexp, env: &Environment) -> Result<[Sexp; N]> {
    let (prefix, rest) = list_prefix::<N>(list, env)?;
    expect!(
        rest.is_nil(),
        LispError::IncorrectArguments(N, N + list_len(&rest, env))
    );
    Ok(prefix)
}
