use msh::Interpreter;

fn main() {
    let mut shell = Interpreter::new();
    if let Err(e) = shell.repl() {
        eprintln!("msh: {e}");
        std::process::exit(1);
    }
}
