#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Builtins and symbols the programs may refer to
#[derive(Arbitrary, Debug)]
enum LispAtom {
    Add, Sub, Mul, Div, Mod, Pow, Min, Max,
    Greater, GreaterEq, Less, LessEq, Eq, NotEq,
    And, Or, Not,
    List, Head, Tail, Join, Eval, Cons, Len, Init,
    True, False,

    Symbol(u8),
    Number(i64),
    Decimal(f64),
    String(String),
}

impl fmt::Display for LispAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            LispAtom::Add => "+",
            LispAtom::Sub => "-",
            LispAtom::Mul => "*",
            LispAtom::Div => "/",
            LispAtom::Mod => "%",
            LispAtom::Pow => "^",
            LispAtom::Min => "min",
            LispAtom::Max => "max",
            LispAtom::Greater => ">",
            LispAtom::GreaterEq => ">=",
            LispAtom::Less => "<",
            LispAtom::LessEq => "<=",
            LispAtom::Eq => "==",
            LispAtom::NotEq => "!=",
            LispAtom::And => "&&",
            LispAtom::Or => "||",
            LispAtom::Not => "!",
            LispAtom::List => "list",
            LispAtom::Head => "head",
            LispAtom::Tail => "tail",
            LispAtom::Join => "join",
            LispAtom::Eval => "eval",
            LispAtom::Cons => "cons",
            LispAtom::Len => "len",
            LispAtom::Init => "init",
            LispAtom::True => "true",
            LispAtom::False => "false",
            // A small alphabet so definitions and uses meet
            LispAtom::Symbol(index) => return write!(f, "v{}", index % 8),
            LispAtom::Number(value) => return write!(f, "{}", value),
            LispAtom::Decimal(value) if value.is_finite() => return write!(f, "{:.3}", value),
            LispAtom::Decimal(_) => "0.5",
            LispAtom::String(value) => return write!(f, "{:?}", value),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum LispCommand {
    // Forms that take quoted arguments
    Def(Vec<LispCommand>, Vec<LispCommand>),
    Local(Vec<LispCommand>, Vec<LispCommand>),
    Lambda(Vec<LispCommand>, Vec<LispCommand>),
    Fun(Vec<LispCommand>, Vec<LispCommand>),
    If(Box<LispCommand>, Vec<LispCommand>, Vec<LispCommand>),

    SExpr(Vec<LispCommand>),
    QExpr(Vec<LispCommand>),
    Atom(LispAtom),
}

fn stringify_arguments(values: &[LispCommand]) -> String {
    values.iter()
        .map(LispCommand::to_string)
        .join(" ")
}

impl fmt::Display for LispCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LispCommand::Def(names, values) => write!(f, "(def {{{}}} {})", stringify_arguments(names), stringify_arguments(values)),
            LispCommand::Local(names, values) => write!(f, "(= {{{}}} {})", stringify_arguments(names), stringify_arguments(values)),
            LispCommand::Lambda(formals, body) => write!(f, "(\\ {{{}}} {{{}}})", stringify_arguments(formals), stringify_arguments(body)),
            LispCommand::Fun(signature, body) => write!(f, "(fun {{{}}} {{{}}})", stringify_arguments(signature), stringify_arguments(body)),
            LispCommand::If(condition, consequent, alternative) => write!(
                f, "(if {} {{{}}} {{{}}})",
                condition, stringify_arguments(consequent), stringify_arguments(alternative),
            ),
            LispCommand::SExpr(children) => write!(f, "({})", stringify_arguments(children)),
            LispCommand::QExpr(children) => write!(f, "{{{}}}", stringify_arguments(children)),
            LispCommand::Atom(atom) => atom.fmt(f),
        }
    }
}

fuzz_target!(|commands: Vec<LispCommand>| {
    let mut interpreter = ownlisp::Interpreter::new();

    for command in commands {
        let _ = interpreter.evaluate_str(&command.to_string());
    }
});
