mod clock;
mod visual;

use clap::Parser;
use clock::SystemClock;
use fat32_sim::clock::Clock;
use fat32_sim::dir;
use fat32_sim::entry::Attributes;
use fat32_sim::{DirEntry, Engine};
use log::{info, warn};
use std::io::{self, Write};

/// A deliberately small disk geometry, matching the original FAT32
/// teaching exercise this shell grew out of.
const CLUSTER_BYTES: usize = 8;
const CLUSTER_COUNT: usize = 64;

#[derive(Parser)]
#[command(name = "fat32-sim-shell", about = "Interactive shell over an in-memory FAT32-style filesystem")]
struct Args {
    /// Print each command's effect on the raw disk buffer after it runs.
    #[arg(long)]
    trace: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let mut engine: Engine<CLUSTER_BYTES, CLUSTER_COUNT> = Engine::new();
    let clock = SystemClock;
    info!("engine initialised: {CLUSTER_COUNT} clusters of {CLUSTER_BYTES} bytes");

    print_help();

    let mut cwd_stream = dir::open::<CLUSTER_BYTES>(engine.root_address());
    let mut cwd_entry: Option<DirEntry> = None;
    let mut stack: Vec<(fat32_sim::FileStream<CLUSTER_BYTES>, Option<DirEntry>)> = Vec::new();

    let stdin = io::stdin();
    loop {
        print!("$ ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let mut words = line.trim().split_whitespace();
        let Some(cmd) = words.next() else { continue };

        match cmd {
            "ls" => {
                for entry in dir::list(&engine, &mut cwd_stream) {
                    if entry.display_name() == ".." {
                        continue;
                    }
                    println!("{}", entry.display_name());
                }
            }
            "cd" => {
                let Some(path) = words.next() else {
                    println!("usage: cd <path>");
                    continue;
                };
                if path == ".." {
                    match stack.pop() {
                        Some((parent_stream, parent_entry)) => {
                            cwd_stream = parent_stream;
                            cwd_entry = parent_entry;
                        }
                        None => println!("already at root"),
                    }
                    continue;
                }
                match dir::get_entry(&engine, &mut cwd_stream, path) {
                    Some(mut entry) => match dir::enter::<CLUSTER_BYTES>(&mut entry, &clock) {
                        Ok(new_stream) => {
                            stack.push((cwd_stream, cwd_entry));
                            cwd_entry = Some(entry);
                            cwd_stream = new_stream;
                        }
                        Err(err) => println!("cd: {err}"),
                    },
                    None => println!("{path}: no such directory"),
                }
            }
            "open" => {
                let Some(path) = words.next() else {
                    println!("usage: open <path>");
                    continue;
                };
                match dir::get_entry(&engine, &mut cwd_stream, path) {
                    Some(mut entry) if !entry.is_directory() => {
                        let mut file = dir::open_entry::<CLUSTER_BYTES>(&mut entry, &clock);
                        let mut content = vec![0u8; entry.size as usize];
                        file.read(&engine, &mut content);
                        print!("{}", String::from_utf8_lossy(&content));
                        dir::close_entry(&engine, &mut entry, file, &clock);
                    }
                    Some(_) => println!("{path}: is a directory"),
                    None => println!("{path}: not found"),
                }
            }
            "new" => {
                let Some(path) = words.next() else {
                    println!("usage: new <name>");
                    continue;
                };
                if dir::get_entry(&engine, &mut cwd_stream, path).is_some() {
                    println!("{path}: already exists");
                    continue;
                }
                dir::new_entry(&mut engine, &mut cwd_stream, path, Attributes::empty(), &clock);
            }
            "mkdir" => {
                let Some(path) = words.next() else {
                    println!("usage: mkdir <name>");
                    continue;
                };
                if dir::get_entry(&engine, &mut cwd_stream, path).is_some() {
                    println!("{path}: already exists");
                    continue;
                }
                let new_dir = dir::new_entry(
                    &mut engine,
                    &mut cwd_stream,
                    path,
                    Attributes::SUBDIRECTORY,
                    &clock,
                );

                // Writing `..` is a CLI responsibility, not the core's
                // (`dir::new_entry` never does this). Built directly
                // rather than through `new_entry`, which would otherwise
                // allocate and immediately discard a data cluster for it.
                let parent_address = cwd_entry
                    .as_ref()
                    .map(|e| e.first_cluster())
                    .unwrap_or_else(|| engine.root_address());
                let (dotdot_name, dotdot_ext) = fat32_sim::name::parse("..");
                let mut dotdot = DirEntry::empty();
                dotdot.name = dotdot_name;
                dotdot.ext = dotdot_ext;
                dotdot.attribs = Attributes::SYSTEM | Attributes::SUBDIRECTORY;
                let now = clock.now();
                dotdot.set_create_time(&now);
                dotdot.set_last_access_date(&now);
                dotdot.set_first_cluster(parent_address);

                let mut child_stream = dir::open::<CLUSTER_BYTES>(new_dir.first_cluster());
                child_stream.write(&mut engine, &dotdot.encode());
            }
            "write" => {
                let (Some(path), Some(text)) = (words.next(), words.next()) else {
                    println!("usage: write <name> <line>");
                    continue;
                };
                let mut entry = match dir::get_entry(&engine, &mut cwd_stream, path) {
                    Some(mut existing) => {
                        dir::clear_entry(&mut engine, &mut existing, &clock);
                        existing
                    }
                    None => dir::new_entry(&mut engine, &mut cwd_stream, path, Attributes::empty(), &clock),
                };
                let mut file = dir::open_entry::<CLUSTER_BYTES>(&mut entry, &clock);
                file.write(&mut engine, text.as_bytes());
                dir::close_entry(&engine, &mut entry, file, &clock);

                if dir::get_entry(&engine, &mut cwd_stream, path).is_some() {
                    cwd_stream.write(&mut engine, &entry.encode());
                }
            }
            "rm" => {
                let Some(path) = words.next() else {
                    println!("usage: rm <name>");
                    continue;
                };
                match dir::remove_entry(&mut engine, &mut cwd_stream, path) {
                    Ok(()) => {}
                    Err(err) => println!("rm: {err}"),
                }
            }
            "stat" => {
                let Some(path) = words.next() else {
                    println!("usage: stat <name>");
                    continue;
                };
                match dir::get_entry(&engine, &mut cwd_stream, path) {
                    Some(entry) => {
                        println!("name: {}", entry.display_name());
                        println!("size: {}", entry.size);
                        println!("kind: {}", if entry.is_directory() { "directory" } else { "file" });
                        println!("first cluster: {}", entry.first_cluster().index());
                    }
                    None => println!("{path}: not found"),
                }
            }
            "disk" => visual::print_disk(&engine),
            "help" => print_help(),
            "exit" => break,
            other => {
                warn!("unknown command: {other}");
                println!("'{other}' is not a recognized command.");
            }
        }

        if args.trace {
            visual::print_disk(&engine);
        }
    }
}

fn print_help() {
    println!("fat32-sim interactive shell");
    println!("ls              - list entries in the current directory");
    println!("cd <path>       - change directory (.. goes up)");
    println!("open <path>     - print a file's contents");
    println!("new <name>      - create an empty file");
    println!("mkdir <name>    - create a subdirectory");
    println!("write <name> <line> - replace a file's contents with <line>");
    println!("rm <name>       - remove a file or (non-protected) directory");
    println!("stat <name>     - show an entry's metadata");
    println!("disk            - print every cluster's FAT state and payload");
    println!("help            - show this menu");
    println!("exit            - quit");
}
