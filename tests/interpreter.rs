use minischeme::{dump_sexp, eval, parse, Environment, LispError, Result, Sexp};

fn run(input: &str, env: &mut Environment) -> Result<Sexp> {
    let forms = parse(input, env)?;
    let mut result = Sexp::Nil;
    for form in &forms {
        result = eval(form, env)?;
    }
    Ok(result)
}

/// Parses, evaluates every form against a fresh session, and prints the
/// last result; the embedding contract end to end.
fn run_and_print(input: &str) -> String {
    let mut env = Environment::new();
    let out = run(input, &mut env).unwrap();
    dump_sexp(&out, &env)
}

#[test]
fn parse_then_print_is_identity() {
    let mut env = Environment::new();
    for src in ["42", "#t", "#f", "()", "some-symbol", r#""text""#] {
        let mut forms = parse(src, &mut env).unwrap();
        assert_eq!(dump_sexp(&forms.pop().unwrap(), &env), src);
    }
}

#[test]
fn print_reparse_print_is_stable() {
    let mut env = Environment::new();
    let mut forms = parse("(1  (2   3)  #t)", &mut env).unwrap();
    let first = dump_sexp(&forms.pop().unwrap(), &env);
    let mut reparsed = parse(&first, &mut env).unwrap();
    let second = dump_sexp(&reparsed.pop().unwrap(), &env);
    assert_eq!(first, second);
    assert_eq!(first, "(1 (2 3) #t)");
}

#[test]
fn arithmetic() {
    assert_eq!(run_and_print("(+ 1 2 3)"), "6");
    assert_eq!(run_and_print("(- 5)"), "-5");
    assert_eq!(run_and_print("(- 10 3 2)"), "5");
    assert_eq!(run_and_print("(/ 8 2 2)"), "2");
    assert_eq!(run_and_print("(sqrt (+ 9 7))"), "4");
}

#[test]
fn quoted_list() {
    assert_eq!(run_and_print("(quote (1 2 3))"), "(1 2 3)");
    assert_eq!(run_and_print("'(1 2 3)"), "(1 2 3)");
}

#[test]
fn if_short_circuits() {
    assert_eq!(run_and_print("(if #t 1 (would-raise))"), "1");
    assert_eq!(run_and_print("(if #f (would-raise) 2)"), "2");
}

#[test]
fn session_accumulates_definitions() {
    let mut env = Environment::new();
    assert_eq!(run("(define x 5) (+ x 1)", &mut env).unwrap(), 6.0.into());
    assert_eq!(
        run("(define (inc n) (+ n 1)) (inc 41)", &mut env).unwrap(),
        42.0.into()
    );
    // later forms observe earlier defines across separate source units
    assert_eq!(run("(inc x)", &mut env).unwrap(), 6.0.into());
}

#[test]
fn closures() {
    let mut env = Environment::new();
    run("(define (make-adder n) (lambda (x) (+ x n)))", &mut env).unwrap();
    run("(define add5 (make-adder 5))", &mut env).unwrap();
    assert_eq!(run("(add5 10)", &mut env).unwrap(), 15.0.into());
}

#[test]
fn mutation() {
    assert_eq!(run_and_print("(define x 1) (set! x 99) x"), "99");
}

#[test]
fn equality() {
    assert_eq!(run_and_print("(= 1 1 1)"), "#t");
    assert_eq!(run_and_print("(= 1 1 2)"), "#f");
    assert_eq!(run_and_print("(= \"a\" \"a\")"), "#t");
    assert_eq!(run_and_print("(= 'a 'a)"), "#t");
}

#[test]
fn failures_leave_the_session_usable() {
    let mut env = Environment::new();
    assert!(matches!(
        run("missing", &mut env),
        Err(LispError::UndefinedVariable(_))
    ));
    assert!(matches!(
        run("(missing 1 2)", &mut env),
        Err(LispError::ProcedureNotFound(_))
    ));
    // the embedding may keep going with the next form
    assert_eq!(run("(+ 20 22)", &mut env).unwrap(), 42.0.into());
}
