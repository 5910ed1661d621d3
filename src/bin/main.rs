fn main() {
    shovel::main();
}
