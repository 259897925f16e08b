use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// classscope - JVM class-file inspection and bytecode disassembly
#[derive(Debug, Parser)]
#[command(name = "classscope", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared across all subcommands.
#[derive(Debug, Parser)]
pub struct GlobalOptions {
    /// Emit output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose (debug-level) logging output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Display class overview: version, flags, class hierarchy, and counts.
    Info {
        /// Path to the .class file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// Dump the constant pool.
    Pool {
        /// Path to the .class file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List class, field, method and code attributes with their raw payloads.
    Attrs {
        /// Path to the .class file.
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },

    /// List method declarations.
    Methods {
        /// Path to the .class file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Show only methods whose name contains this text.
        #[arg(long)]
        name: Option<String>,
    },

    /// Disassemble method bytecode (javap-style output).
    Disasm {
        /// Path to the .class file.
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Disassemble only methods with this exact name.
        #[arg(long, value_name = "NAME")]
        method: Option<String>,

        /// Show raw instruction bytes above each instruction.
        #[arg(long)]
        bytes: bool,

        /// Hide code offsets (shown by default).
        #[arg(long)]
        no_offsets: bool,

        /// Print constant-pool indices without resolving them.
        #[arg(long)]
        raw: bool,
    },
}
