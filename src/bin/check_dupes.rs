//! Scans a directory of SGF files and reports Dyer signature collisions,
//! i.e. pairs of records that are almost certainly the same game.

use anyhow::Result;
use std::collections::HashMap;
use std::env;
use std::fs;

use twogtp::sgf;

fn main() -> Result<()> {
    let Some(dir) = env::args().nth(1) else {
        return Ok(());
    };

    let mut names: Vec<String> = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".sgf") {
            names.push(name);
        }
    }
    names.sort();

    let mut dyers: HashMap<String, String> = HashMap::new();
    let mut count = 0usize;

    for name in names {
        let path = std::path::Path::new(&dir).join(&name);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                eprintln!("{name}: {err}");
                continue;
            }
        };
        let tree = match sgf::parse(&text) {
            Ok(tree) => tree,
            Err(err) => {
                eprintln!("{name}: {err}");
                continue;
            }
        };

        match dyers.get(&tree.dyer()) {
            Some(first) => println!("Collision:  {name}  ==  {first}"),
            None => {
                dyers.insert(tree.dyer(), name.clone());
            }
        }
        count += 1;
    }

    println!("{count} files checked.");
    Ok(())
}
