fn main() {
    plsql_ast::cli::run();
}
