use super::ast::{Arg, BlockId, BlockKind, BlockNode, Program, Script, Value};
use super::error::Warning;

/// Keywords that start a block. Seeing one of these ends the argument list
/// of the block being parsed.
const BLOCK_KEYWORDS: [&str; 8] = ["when", "move", "say", "wait", "repeat", "if", "set", "change"];

/// Build a `Program` from a token sequence.
///
/// A single forward cursor, no backtracking. Unknown top-level tokens and
/// incomplete declarations are skipped with a warning; parsing is total.
pub fn parse(tokens: Vec<String>) -> (Program, Vec<Warning>) {
    let mut parser = Parser::new(tokens);
    let program = parser.run();
    (program, parser.warnings)
}

struct Parser {
    tokens: Vec<String>,
    pos: usize,
    warnings: Vec<Warning>,
}

impl Parser {
    fn new(tokens: Vec<String>) -> Self {
        Self {
            tokens,
            pos: 0,
            warnings: Vec::new(),
        }
    }

    fn run(&mut self) -> Program {
        let mut program = Program::new();

        while let Some(token) = self.peek() {
            match token {
                "when" => {
                    if let Some(script) = self.parse_script(&mut program) {
                        program.scripts.push(script);
                    }
                }
                "var" => self.parse_variable_declaration(&mut program),
                "list" => self.parse_list_declaration(&mut program),
                other => {
                    self.warnings
                        .push(Warning::parser(format!("skipped unknown token `{other}`")));
                    self.pos += 1;
                }
            }
        }

        program
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn peek(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(String::as_str)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn is_block_start(token: &str) -> bool {
        BLOCK_KEYWORDS.contains(&token)
    }

    fn kind_of(name: &str) -> BlockKind {
        match name {
            "when" => BlockKind::Event,
            "move" => BlockKind::Motion,
            "say" => BlockKind::Looks,
            "wait" | "repeat" | "if" => BlockKind::Control,
            "set" | "change" => BlockKind::Variables,
            _ => BlockKind::Custom,
        }
    }

    /// when/repeat/if open a scope: their continuation chain is a body,
    /// not a sibling statement.
    fn opens_scope(name: &str) -> bool {
        matches!(name, "when" | "repeat" | "if")
    }

    /// Numeric if it parses as a finite floating-point value.
    fn is_number(token: &str) -> bool {
        token.parse::<f64>().is_ok_and(f64::is_finite)
    }

    /// A block argument or expression atom, kept verbatim when not numeric.
    fn value_of(token: &str) -> Value {
        match token.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(token.to_string()),
        }
    }

    /// A declaration initial value: numeric text parses as a number, any
    /// other token is stored with its quote characters stripped.
    fn declared_value(token: &str) -> Value {
        if Self::is_number(token) {
            Self::value_of(token)
        } else {
            Value::Text(token.chars().filter(|c| *c != '"' && *c != '\'').collect())
        }
    }

    // ── Scripts and blocks ─────────────────────────────────────────

    fn parse_script(&mut self, program: &mut Program) -> Option<Script> {
        self.parse_block(program).map(|root| Script { root })
    }

    fn parse_block(&mut self, program: &mut Program) -> Option<BlockId> {
        let token = self.peek()?;
        if !Self::is_block_start(token) {
            return None;
        }

        let name = token.to_string();
        let kind = Self::kind_of(&name);
        self.pos += 1;

        // Collect arguments until another block keyword or end of input.
        let mut args = Vec::new();
        loop {
            let Some(token) = self.peek() else { break };
            if Self::is_block_start(token) {
                break;
            }
            if token == "(" {
                self.pos += 1;
                args.push(Arg::Expression(self.parse_expression_atoms()));
            } else {
                let arg = match Self::value_of(token) {
                    Value::Number(n) => Arg::Number(n),
                    Value::Text(s) => Arg::Text(s),
                };
                args.push(arg);
                self.pos += 1;
            }
        }

        // A following block keyword continues the chain: as the body of a
        // scope-opening block, otherwise as the next sibling statement.
        let chain = self.parse_block(program);
        let (body, next) = if Self::opens_scope(&name) {
            (chain, None)
        } else {
            (None, chain)
        };

        Some(program.alloc(BlockNode {
            kind,
            name,
            args,
            body,
            next,
        }))
    }

    /// Raw-collect tokens up to the matching `)`. No deeper nesting: an
    /// inner `(` would simply be collected as an atom by value.
    fn parse_expression_atoms(&mut self) -> Vec<Value> {
        let mut atoms = Vec::new();
        loop {
            let Some(token) = self.peek() else { break };
            if token == ")" {
                break;
            }
            atoms.push(Self::value_of(token));
            self.pos += 1;
        }
        if !self.at_end() {
            self.pos += 1; // consume ')'
        }
        atoms
    }

    // ── Declarations ───────────────────────────────────────────────

    fn parse_variable_declaration(&mut self, program: &mut Program) {
        self.pos += 1; // 'var'

        let Some(name) = self.peek() else {
            self.warnings
                .push(Warning::parser("variable declaration missing a name"));
            return;
        };
        let name = name.to_string();
        self.pos += 1;

        let mut value = Value::Number(0.0);
        if self.peek() == Some("=") {
            self.pos += 1;
            if let Some(token) = self.peek() {
                value = Self::declared_value(token);
                self.pos += 1;
            } else {
                self.warnings.push(Warning::parser(format!(
                    "variable `{name}` missing a value after `=`"
                )));
            }
        }

        program.variables.insert(name, value);
    }

    fn parse_list_declaration(&mut self, program: &mut Program) {
        self.pos += 1; // 'list'

        let Some(name) = self.peek() else {
            self.warnings
                .push(Warning::parser("list declaration missing a name"));
            return;
        };
        let name = name.to_string();
        self.pos += 1;

        let mut values = Vec::new();
        if self.peek() == Some("[") {
            self.pos += 1;
            loop {
                let Some(token) = self.peek() else { break };
                if token == "]" {
                    break;
                }
                values.push(Self::declared_value(token));
                self.pos += 1;
            }
            if !self.at_end() {
                self.pos += 1; // consume ']'
            }
        }

        program.lists.insert(name, values);
    }
}
