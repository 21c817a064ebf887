use crossbeam_channel::{unbounded, Receiver, Sender};
use std::process::Child;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(600);

struct Registration {
    name: String,
    child: Arc<Mutex<Child>>,
}

pub struct Watchdog {
    deadlines: Sender<Instant>,
    registrations: Sender<Registration>,
}

impl Watchdog {
    pub fn spawn() -> Watchdog {
        let (deadline_tx, deadline_rx) = unbounded();
        let (register_tx, register_rx) = unbounded();
        thread::spawn(move || killer(deadline_rx, register_rx));
        Watchdog {
            deadlines: deadline_tx,
            registrations: register_tx,
        }
    }

    pub fn push_deadline(&self, deadline: Instant) {
        let _ = self.deadlines.send(deadline);
    }

    pub fn register(&self, name: String, child: Arc<Mutex<Child>>) {
        let _ = self.registrations.send(Registration { name, child });
    }
}

fn killer(deadlines: Receiver<Instant>, registrations: Receiver<Registration>) {
    let mut deadline = Instant::now();
    let mut armed = false;
    let mut engines: Vec<Registration> = Vec::new();

    loop {
        thread::sleep(TICK);

        drain_deadlines(&deadlines, &mut deadline, &mut armed);
        while let Ok(registration) = registrations.try_recv() {
            engines.push(registration);
        }

        if armed && Instant::now() > deadline {
            println!("killer(): timeout");
            for registration in &engines {
                print!("Killing {}...", registration.name);
                match registration.child.lock().unwrap().kill() {
                    Ok(()) => println!(),
                    Err(err) => println!(" {err}"),
                }
            }
            std::process::exit(1);
        }
    }
}

fn drain_deadlines(deadlines: &Receiver<Instant>, deadline: &mut Instant, armed: &mut bool) {
    while let Ok(submitted) = deadlines.try_recv() {
        *deadline = submitted;
        *armed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_deadline_wins() {
        let (tx, rx) = unbounded();
        let far = Instant::now() + Duration::from_secs(600);
        let near = Instant::now() + Duration::from_secs(5);
        tx.send(far).unwrap();
        tx.send(near).unwrap();

        let mut deadline = Instant::now();
        let mut armed = false;
        drain_deadlines(&rx, &mut deadline, &mut armed);
        assert!(armed);
        assert_eq!(deadline, near);
    }

    #[test]
    fn unarmed_until_first_submission() {
        let (_tx, rx) = unbounded::<Instant>();
        let mut deadline = Instant::now();
        let mut armed = false;
        drain_deadlines(&rx, &mut deadline, &mut armed);
        assert!(!armed);
    }
}
