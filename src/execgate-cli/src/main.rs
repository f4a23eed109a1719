//! Policy gate wrapper binary.
//!
//! Decides whether a command may run and, if so, replaces itself with it.
//!
//! Usage:
//!   gate [--cwd /path/to/cwd] [--writable /path]... [--network on|off] \
//!        -- command arg1 arg2

fn main() -> ! {
    execgate_cli::run_main()
}
