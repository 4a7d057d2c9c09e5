// Copyright 2017-2019 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

#[macro_use]
extern crate clap;
#[macro_use]
extern crate serde_derive;

use std::error::Error;
use std::io::{self, Write};
use std::process;
use std::time::Instant;

use castellan::{divide, perft, Move, Position};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use hashbrown::HashMap;

#[derive(Serialize)]
struct DivideRecord {
    #[serde(rename = "move")]
    mov: Move,
    nodes: u64,
}

fn moves_arg() -> Arg<'static, 'static> {
    Arg::with_name("moves")
        .help("Moves to play from the starting position, in coordinate form (e2e4)")
        .value_name("MOVE")
        .short("m")
        .long("moves")
        .takes_value(true)
        .multiple(true)
}

fn main() {
    env_logger::init();
    let matches = App::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("perft")
                .about("PERFT analysis of board positions")
                .arg(
                    Arg::with_name("depth")
                        .help("Depth of move tree to search")
                        .value_name("DEPTH")
                        .short("d")
                        .long("depth")
                        .takes_value(true)
                        .required(true),
                )
                .arg(moves_arg())
                .arg(
                    Arg::with_name("format")
                        .help("Output format; json and csv print a divide table")
                        .value_name("FORMAT")
                        .long("format")
                        .takes_value(true)
                        .possible_values(&["text", "json", "csv"])
                        .default_value("text"),
                ),
        )
        .subcommand(
            SubCommand::with_name("moves")
                .about("List the legal moves of a position")
                .arg(moves_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        ("perft", Some(matches)) => run_perft(matches),
        ("moves", Some(matches)) => run_moves(matches),
        _ => unreachable!(),
    }
}

fn setup_position(matches: &ArgMatches) -> Position {
    let played = matches.values_of("moves").into_iter().flatten();
    match play_moves(played) {
        Ok(pos) => pos,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    }
}

// Plays moves from the starting position. Each one has to be the coordinate
// form of a legal move in the position it is played in.
fn play_moves<'a, I>(moves: I) -> Result<Position, String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut pos = Position::new();
    for text in moves {
        let legal: HashMap<String, Move> = pos
            .legal_moves()
            .iter()
            .map(|&mov| (mov.to_string(), mov))
            .collect();
        match legal.get(text) {
            Some(&mov) => pos.apply_move(mov),
            None => return Err(format!("illegal move: {}", text)),
        }
    }

    Ok(pos)
}

fn run_perft(matches: &ArgMatches) {
    let depth = value_t_or_exit!(matches, "depth", u32);
    let pos = setup_position(matches);
    let result = match matches.value_of("format").unwrap_or("text") {
        "json" => write_json(io::stdout(), &divide_records(&pos, depth)),
        "csv" => write_csv(io::stdout(), &divide_records(&pos, depth)),
        _ => {
            print_perft(&pos, depth);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("failed to write output: {}", err);
        process::exit(1);
    }
}

fn divide_records(pos: &Position, depth: u32) -> Vec<DivideRecord> {
    divide(pos, depth)
        .into_iter()
        .map(|(mov, nodes)| DivideRecord { mov, nodes })
        .collect()
}

fn write_json<W: Write>(mut writer: W, records: &[DivideRecord]) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(())
}

fn write_csv<W: Write>(writer: W, records: &[DivideRecord]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }

    writer.flush()?;
    Ok(())
}

fn print_perft(pos: &Position, depth: u32) {
    println!("depth: {}", depth);
    println!();
    println!("{}", pos);
    println!();
    for i in 1..depth + 1 {
        let start = Instant::now();
        let results = perft(pos, i);
        let ms = start.elapsed().as_millis();
        println!("perft({}) = {} ({} ms)", i, results, ms);
    }
}

fn run_moves(matches: &ArgMatches) {
    let mut pos = setup_position(matches);
    let moves = pos.legal_moves();
    println!("{}", pos);
    println!("{:?} to move", pos.side_to_move());
    if pos.checkmate() {
        println!("checkmate");
    } else if pos.stalemate() {
        println!("stalemate");
    } else if pos.is_check() {
        println!("check");
    }

    let mut names: Vec<String> = moves.iter().map(|mov| mov.to_string()).collect();
    names.sort();
    println!("{} legal moves: {}", names.len(), names.join(" "));
}
