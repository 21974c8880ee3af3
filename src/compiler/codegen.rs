use super::ast::{Arg, BlockId, BlockKind, BlockNode, Program, Value};
use super::error::Warning;

/// Runtime preamble emitted ahead of every program: one sprite whose
/// direction starts at 90°, with `say`/`move` printing through console.log
/// so the host can capture output.
const RUNTIME_PREAMBLE: &str = r#"// Generated by blockscript
// Runtime support
const spriteRuntime = {
    sprites: {},
    stage: { width: 480, height: 360 },
    currentSprite: 'Sprite1',
    init: function() {
        this.sprites.Sprite1 = {
            x: 0,
            y: 0,
            direction: 90,
            costumes: ['default'],
            currentCostume: 0,
            visible: true,
            say: function(message, seconds) {
                console.log(`${spriteRuntime.currentSprite} says: ${message}`);
                if (seconds) {
                    setTimeout(() => console.log(`${spriteRuntime.currentSprite} stopped saying`), seconds * 1000);
                }
            },
            move: function(steps) {
                const radians = this.direction * Math.PI / 180;
                this.x += steps * Math.cos(radians);
                this.y += steps * Math.sin(radians);
                console.log(`${spriteRuntime.currentSprite} moved to (${this.x}, ${this.y})`);
            }
        };
    }
};

spriteRuntime.init();

"#;

const SPRITE: &str = "spriteRuntime.sprites[spriteRuntime.currentSprite]";

/// Render a program into JavaScript source text. Deterministic and total:
/// unrecognized blocks become a comment, never a failure.
pub fn generate(program: &Program) -> (String, Vec<Warning>) {
    let mut generator = CodeGenerator::new(program);
    generator.run();
    (generator.output, generator.warnings)
}

struct CodeGenerator<'a> {
    program: &'a Program,
    output: String,
    indent: usize,
    warnings: Vec<Warning>,
}

impl<'a> CodeGenerator<'a> {
    fn new(program: &'a Program) -> Self {
        Self {
            program,
            output: String::new(),
            indent: 0,
            warnings: Vec::new(),
        }
    }

    fn run(&mut self) {
        self.output.push_str(RUNTIME_PREAMBLE);

        self.write("// Variables\n");
        for (name, value) in &self.program.variables {
            let rendered = render_value(value);
            self.write(&format!("let {name} = {rendered};\n"));
        }
        self.output.push('\n');

        self.write("// Lists\n");
        for (name, values) in &self.program.lists {
            let items: Vec<String> = values.iter().map(render_value).collect();
            let joined = items.join(", ");
            self.write(&format!("let {name} = [{joined}];\n"));
        }
        self.output.push('\n');

        self.write("// Scripts\n");
        for script in &self.program.scripts {
            self.emit_block(script.root);
        }
    }

    fn block(&self, id: BlockId) -> &'a BlockNode {
        self.program.block(id)
    }

    /// Emit one block, then walk its sibling link. Scope bodies are
    /// consumed by the scope emitters below and never reappear here.
    fn emit_block(&mut self, id: BlockId) {
        let block = self.block(id);
        match (block.kind, block.name.as_str()) {
            (BlockKind::Event, "when") => self.emit_when(block),
            (BlockKind::Motion, "move") => self.emit_move(block),
            (BlockKind::Looks, "say") => self.emit_say(block),
            (BlockKind::Control, "wait") => self.emit_wait(block),
            (BlockKind::Control, "repeat") => self.emit_repeat(block),
            (BlockKind::Control, "if") => self.emit_if(block),
            (BlockKind::Variables, "set") => self.emit_set(block),
            (BlockKind::Variables, "change") => self.emit_change(block),
            _ => self.emit_unsupported(block),
        }

        if let Some(next) = block.next {
            self.emit_block(next);
        }
    }

    fn emit_body(&mut self, block: &BlockNode) {
        if let Some(body) = block.body {
            self.emit_block(body);
        }
    }

    fn emit_when(&mut self, block: &BlockNode) {
        match block.args.first() {
            Some(Arg::Text(event)) if event == "flagClicked" => {
                self.write("// When green flag clicked\n");
                self.write("document.addEventListener('DOMContentLoaded', async function() {\n");
                self.indent += 1;
                self.emit_body(block);
                self.indent -= 1;
                self.write("});\n\n");
            }
            Some(Arg::Text(event)) if event.contains("keyPressed") => {
                let key = event.replace("keyPressed", "");
                self.write(&format!("// When {key} key pressed\n"));
                self.write("document.addEventListener('keydown', async function(event) {\n");
                self.indent += 1;
                let gate = key.to_lowercase();
                self.write(&format!("if (event.key.toLowerCase() === \"{gate}\") {{\n"));
                self.indent += 1;
                self.emit_body(block);
                self.indent -= 1;
                self.write("}\n");
                self.indent -= 1;
                self.write("});\n\n");
            }
            _ => {}
        }
    }

    fn emit_move(&mut self, block: &BlockNode) {
        let steps = Self::format_arg(block.args.first());
        self.write(&format!("{SPRITE}.move({steps});\n"));
    }

    fn emit_say(&mut self, block: &BlockNode) {
        let message = Self::format_arg(block.args.first());
        if let Some(seconds) = block.args.get(1) {
            let seconds = Self::format_arg(Some(seconds));
            self.write(&format!("{SPRITE}.say({message}, {seconds});\n"));
        } else {
            self.write(&format!("{SPRITE}.say({message});\n"));
        }
    }

    fn emit_wait(&mut self, block: &BlockNode) {
        let seconds = Self::format_arg(block.args.first());
        self.write(&format!(
            "await new Promise(resolve => setTimeout(resolve, {seconds} * 1000));\n"
        ));
    }

    fn emit_repeat(&mut self, block: &BlockNode) {
        let count = Self::format_arg(block.args.first());
        self.write(&format!("for (let i = 0; i < {count}; i++) {{\n"));
        self.indent += 1;
        self.emit_body(block);
        self.indent -= 1;
        self.write("}\n");
    }

    fn emit_if(&mut self, block: &BlockNode) {
        let condition = Self::format_arg(block.args.first());
        self.write(&format!("if ({condition}) {{\n"));
        self.indent += 1;
        self.emit_body(block);
        self.indent -= 1;
        self.write("}\n");
    }

    fn emit_set(&mut self, block: &BlockNode) {
        let name = Self::target_name(block.args.first());
        let value = Self::format_arg(block.args.get(1));
        self.write(&format!("{name} = {value};\n"));
    }

    fn emit_change(&mut self, block: &BlockNode) {
        let name = Self::target_name(block.args.first());
        let value = Self::format_arg(block.args.get(1));
        self.write(&format!("{name} += {value};\n"));
    }

    fn emit_unsupported(&mut self, block: &BlockNode) {
        self.write(&format!("// Unsupported block: {}\n", block.name));
        self.warnings.push(Warning::generator(format!(
            "no emitter for {:?} block `{}`",
            block.kind, block.name
        )));
    }

    /// Assignment target: always unquoted, never re-quoted.
    fn target_name(arg: Option<&Arg>) -> String {
        match arg {
            Some(Arg::Number(n)) => render_number(*n),
            Some(Arg::Text(s)) => s.clone(),
            Some(Arg::Expression(atoms)) => render_expression(atoms),
            None => String::new(),
        }
    }

    /// Numbers render as literals; quoted strings keep their delimiters;
    /// bare text renders verbatim as a reference, never re-quoted.
    fn format_arg(arg: Option<&Arg>) -> String {
        match arg {
            Some(Arg::Number(n)) => render_number(*n),
            Some(Arg::Text(s)) => s.clone(),
            Some(Arg::Expression(atoms)) => render_expression(atoms),
            None => "\"\"".to_string(),
        }
    }

    fn write(&mut self, code: &str) {
        for _ in 0..self.indent {
            self.output.push_str("    ");
        }
        self.output.push_str(code);
    }
}

fn render_number(n: f64) -> String {
    format!("{n}")
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Number(n) => render_number(*n),
        Value::Text(s) => format!("\"{s}\""),
    }
}

/// Space-joined raw tokens inside parentheses — the only expression
/// rendering the generator understands.
fn render_expression(atoms: &[Value]) -> String {
    let rendered: Vec<String> = atoms
        .iter()
        .map(|atom| match atom {
            Value::Number(n) => render_number(*n),
            Value::Text(s) => s.clone(),
        })
        .collect();
    format!("({})", rendered.join(" "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::compiler::ast::{BlockKind, BlockNode, Script};
    use crate::compiler::lexer::tokenize;
    use crate::compiler::parser::parse;

    fn gen(src: &str) -> String {
        let (program, _) = parse(tokenize(src).0);
        generate(&program).0
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn flag_clicked_emits_one_listener_and_one_move() {
        let js = gen("when flagClicked move 10");
        assert_eq!(count(&js, "document.addEventListener('DOMContentLoaded'"), 1);
        assert_eq!(count(&js, ".move(10);"), 1);
    }

    #[test]
    fn body_renders_inside_the_handler() {
        let js = gen("when flagClicked move 10");
        let expected = "document.addEventListener('DOMContentLoaded', async function() {\n\
                        \x20   spriteRuntime.sprites[spriteRuntime.currentSprite].move(10);\n\
                        });\n";
        assert!(js.contains(expected), "handler body misplaced:\n{js}");
    }

    #[test]
    fn repeat_bounds_and_single_body_emission() {
        let js = gen("when flagClicked repeat 3 move 5");
        assert_eq!(count(&js, "for (let i = 0; i < 3; i++) {"), 1);
        assert_eq!(count(&js, ".move(5);"), 1);
        // Loop body sits one level deeper than the loop header.
        assert!(js.contains("    for (let i = 0; i < 3; i++) {\n        spriteRuntime"));
    }

    #[test]
    fn set_and_change_assignments() {
        let js = gen("var score = 5 when flagClicked set score 10 change score 1");
        assert!(js.contains("let score = 5;"));
        assert!(js.contains("score = 10;"));
        assert!(js.contains("score += 1;"));
    }

    #[test]
    fn declarations_render_in_insertion_order() {
        let js = gen("var a = 5 var b = \"hi\" list items [1 2 3]");
        assert!(js.contains("let a = 5;"));
        assert!(js.contains("let b = \"hi\";"));
        assert!(js.contains("let items = [1, 2, 3];"));
        assert!(js.find("let a = 5;").unwrap() < js.find("let b = \"hi\";").unwrap());
    }

    #[test]
    fn say_with_and_without_duration() {
        let js = gen("when flagClicked say \"hello\" 2");
        assert!(js.contains(".say(\"hello\", 2);"));

        let js = gen("when flagClicked say \"hi\"");
        assert!(js.contains(".say(\"hi\");"));
    }

    #[test]
    fn wait_emits_a_suspend_expression() {
        let js = gen("when flagClicked wait 1");
        assert!(js.contains("await new Promise(resolve => setTimeout(resolve, 1 * 1000));"));
    }

    #[test]
    fn event_handlers_are_async() {
        let js = gen("when flagClicked wait 1");
        assert!(js.contains("'DOMContentLoaded', async function() {"));

        let js = gen("when spacekeyPressed wait 1");
        assert!(js.contains("'keydown', async function(event) {"));
    }

    #[test]
    fn key_pressed_gate_is_case_insensitive() {
        let js = gen("when spacekeyPressed move 10");
        assert_eq!(count(&js, "document.addEventListener('keydown'"), 1);
        assert!(js.contains("if (event.key.toLowerCase() === \"space\") {"));
        assert_eq!(count(&js, ".move(10);"), 1);
    }

    #[test]
    fn if_renders_condition_without_else() {
        let js = gen("when flagClicked if (x > 5) say \"big\"");
        assert!(js.contains("if ((x 5)) {"));
        assert!(!js.contains("else"));
    }

    #[test]
    fn expression_argument_renders_space_joined() {
        let js = gen("when flagClicked move (x 5)");
        assert!(js.contains(".move((x 5));"));
    }

    #[test]
    fn bare_reference_is_not_requoted() {
        let js = gen("when flagClicked say score");
        assert!(js.contains(".say(score);"));
    }

    #[test]
    fn unsupported_block_becomes_a_comment() {
        let mut program = Program::new();
        let root = program.alloc(BlockNode {
            kind: BlockKind::Custom,
            name: "teleport".to_string(),
            args: Vec::new(),
            body: None,
            next: None,
        });
        program.scripts.push(Script { root });

        let (js, warnings) = generate(&program);
        assert!(js.contains("// Unsupported block: teleport"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn empty_program_still_emits_the_runtime() {
        let js = gen("");
        assert!(js.contains("spriteRuntime.init();"));
        assert!(js.contains("// Variables"));
        assert!(js.contains("// Lists"));
        assert!(js.contains("// Scripts"));
    }

    #[test]
    fn fractional_numbers_keep_their_point() {
        let js = gen("var x = 2.5 when flagClicked move -1.5");
        assert!(js.contains("let x = 2.5;"));
        assert!(js.contains(".move(-1.5);"));
    }

    #[test]
    fn whole_numbers_render_without_a_point() {
        let js = gen("var x = 10 list l [4]");
        assert!(js.contains("let x = 10;"));
        assert!(js.contains("let l = [4];"));
    }
}
