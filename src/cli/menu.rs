//! Numbered text menu over a [`BookingService`]
//!
//! The menu is synchronous: it reads one line at a time from any
//! `BufRead` and drives the async service through a runtime handle. Input
//! and output are generic, so tests script a whole session with byte
//! buffers.
//!
//! # Design
//!
//! - Errors from the service are printed and the loop continues
//! - End of input exits the loop like option 9
//! - The train picked in "Search trains" stays selected for "Book a seat"

use crate::core::{BookingService, ConsistencyReport, PersistenceStore};
use crate::io::{format_seat_map, format_train, write_tickets_csv};
use crate::types::{BookingError, TrainId};
use std::io::{self, BufRead, Write};
use tokio::runtime::Handle;

const OPTIONS: &str = "\
Choose option
1. Sign up
2. Login
3. Fetch bookings
4. Search trains
5. Book a seat
6. Cancel my booking
7. Logout
8. Consistency report
9. Exit the app";

/// Interactive front end reading commands from `R` and writing to `W`
pub struct Menu<S, R, W> {
    runtime: Handle,
    service: BookingService<S>,
    input: R,
    output: W,
    selected_train: Option<TrainId>,
}

impl<S, R, W> Menu<S, R, W>
where
    S: PersistenceStore,
    R: BufRead,
    W: Write,
{
    /// Create a menu
    ///
    /// `runtime` must belong to a multi-threaded runtime and must not be
    /// called from inside an async context.
    pub fn new(runtime: Handle, service: BookingService<S>, input: R, output: W) -> Self {
        Menu {
            runtime,
            service,
            input,
            output,
            selected_train: None,
        }
    }

    pub fn service(&self) -> &BookingService<S> {
        &self.service
    }

    pub fn selected_train(&self) -> Option<&str> {
        self.selected_train.as_deref()
    }

    /// Run the loop until option 9 or end of input
    ///
    /// # Errors
    ///
    /// Only I/O errors on the input or output streams end the loop early.
    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "Running Train Booking System")?;

        loop {
            writeln!(self.output, "{}", OPTIONS)?;
            self.output.flush()?;

            let Some(line) = self.read_line()? else {
                break;
            };

            match line.parse::<u32>() {
                Ok(1) => self.sign_up()?,
                Ok(2) => self.login()?,
                Ok(3) => self.fetch_bookings()?,
                Ok(4) => self.search_trains()?,
                Ok(5) => self.book_seat()?,
                Ok(6) => self.cancel_booking()?,
                Ok(7) => self.logout()?,
                Ok(8) => self.consistency_report()?,
                Ok(9) => break,
                _ => writeln!(self.output, "Please enter a number between 1 and 9")?,
            }
        }

        writeln!(self.output, "Goodbye!")?;
        self.output.flush()
    }

    /// Next trimmed input line, `None` at end of input
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()?;
        self.read_line()
    }

    fn prompt_index(&mut self, message: &str) -> io::Result<Option<Result<usize, BookingError>>> {
        Ok(self.prompt(message)?.map(|text| {
            text.parse::<usize>().map_err(|_| {
                BookingError::invalid_input(format!("'{}' is not a non-negative number", text))
            })
        }))
    }

    fn report_error(&mut self, error: &BookingError) -> io::Result<()> {
        writeln!(self.output, "Error: {}", error)
    }

    fn sign_up(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Enter the username to signup")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Enter the password to signup")? else {
            return Ok(());
        };

        match self.runtime.block_on(self.service.sign_up(&username, &password)) {
            Ok(user) => writeln!(
                self.output,
                "User {} registered. Please login to continue",
                user.username
            ),
            Err(e) => self.report_error(&e),
        }
    }

    fn login(&mut self) -> io::Result<()> {
        let Some(username) = self.prompt("Enter the username to login")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Enter the password to login")? else {
            return Ok(());
        };

        match self.runtime.block_on(self.service.login(&username, &password)) {
            Ok(user) => writeln!(self.output, "Welcome {}", user.username),
            Err(e) => self.report_error(&e),
        }
    }

    fn fetch_bookings(&mut self) -> io::Result<()> {
        let tickets = match self.runtime.block_on(self.service.fetch_bookings()) {
            Ok(tickets) => tickets,
            Err(e) => return self.report_error(&e),
        };

        if tickets.is_empty() {
            return writeln!(self.output, "No bookings yet");
        }
        write_tickets_csv(&tickets, &mut self.output).map_err(io::Error::other)
    }

    fn search_trains(&mut self) -> io::Result<()> {
        let Some(source) = self.prompt("Type your source station")? else {
            return Ok(());
        };
        let Some(destination) = self.prompt("Type your destination station")? else {
            return Ok(());
        };

        let trains = self
            .runtime
            .block_on(self.service.search_trains(&source, &destination));
        if trains.is_empty() {
            return writeln!(
                self.output,
                "No trains found from {} to {}",
                source, destination
            );
        }

        for (number, train) in trains.iter().enumerate() {
            writeln!(self.output, "{}. {}", number + 1, format_train(train))?;
        }

        let Some(choice) = self.prompt("Select a train by typing 1, 2, 3...")? else {
            return Ok(());
        };
        match choice.parse::<usize>() {
            Ok(n) if (1..=trains.len()).contains(&n) => {
                let train_id = trains[n - 1].train_id.clone();
                writeln!(self.output, "Selected train {}", train_id)?;
                self.selected_train = Some(train_id);
                Ok(())
            }
            _ => writeln!(
                self.output,
                "Please enter a number between 1 and {}",
                trains.len()
            ),
        }
    }

    fn book_seat(&mut self) -> io::Result<()> {
        let Some(train_id) = self.selected_train.clone() else {
            return writeln!(self.output, "Please search and select a train first");
        };

        match self.runtime.block_on(self.service.seat_map(&train_id)) {
            Ok(rows) => {
                writeln!(self.output, "Select a seat out of these seats")?;
                write!(self.output, "{}", format_seat_map(&rows))?;
            }
            Err(e) => return self.report_error(&e),
        }

        let row = match self.prompt_index("Enter the row")? {
            None => return Ok(()),
            Some(Err(e)) => return self.report_error(&e),
            Some(Ok(row)) => row,
        };
        let col = match self.prompt_index("Enter the column")? {
            None => return Ok(()),
            Some(Err(e)) => return self.report_error(&e),
            Some(Ok(col)) => col,
        };

        writeln!(self.output, "Booking your seat....")?;
        match self
            .runtime
            .block_on(self.service.book_seat(&train_id, row, col))
        {
            Ok(ticket) => writeln!(
                self.output,
                "Booked! Enjoy your journey. Ticket id: {}",
                ticket.ticket_id
            ),
            Err(e) => self.report_error(&e),
        }
    }

    fn cancel_booking(&mut self) -> io::Result<()> {
        let Some(ticket_id) = self.prompt("Enter the ticket id to cancel")? else {
            return Ok(());
        };

        match self
            .runtime
            .block_on(self.service.cancel_booking(&ticket_id))
        {
            Ok(ticket) => writeln!(self.output, "Booking {} cancelled", ticket.ticket_id),
            Err(e) => self.report_error(&e),
        }
    }

    fn logout(&mut self) -> io::Result<()> {
        if !self.service.is_authenticated() {
            return writeln!(self.output, "You are not logged in");
        }
        self.service.logout();
        writeln!(self.output, "Logged out")
    }

    fn consistency_report(&mut self) -> io::Result<()> {
        let report = self.runtime.block_on(self.service.audit());
        write_report(&report, &mut self.output)
    }
}

/// Print a consistency report, one anomaly per line
fn write_report(report: &ConsistencyReport, output: &mut impl Write) -> io::Result<()> {
    if report.is_consistent() {
        return writeln!(output, "Seat grids and tickets are consistent");
    }
    for seat in &report.orphaned_seats {
        writeln!(output, "Orphaned seat: {}", seat)?;
    }
    for dangling in &report.dangling_tickets {
        writeln!(
            output,
            "Dangling ticket {} of {}: {}",
            dangling.ticket.ticket_id, dangling.username, dangling.reason
        )?;
    }
    for seat in &report.contested_seats {
        writeln!(output, "Contested seat: {}", seat)?;
    }
    for username in &report.duplicate_usernames {
        writeln!(output, "Duplicate username: {}", username)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StoreConfig;
    use crate::core::{BookingEngine, Sha256PasswordHasher};
    use crate::io::InMemoryStore;
    use crate::types::{SeatGrid, Stop, Train};
    use rstest::rstest;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::runtime::Runtime;

    fn runtime() -> Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn service(runtime: &Runtime) -> BookingService<InMemoryStore> {
        runtime.block_on(async {
            let engine = BookingEngine::open(
                Arc::new(InMemoryStore::new()),
                Box::new(Sha256PasswordHasher::with_iterations(4)),
                &StoreConfig::new("unused", Duration::from_secs(1)),
            )
            .await
            .unwrap();
            engine
                .add_train(Train::new(
                    "T1",
                    vec![Stop::new("A", "08:00"), Stop::new("C", "10:00")],
                    SeatGrid::new(2, 2),
                ))
                .await
                .unwrap();
            BookingService::new(Arc::new(engine))
        })
    }

    /// Run a scripted session and return everything the menu printed
    fn run_script(script: &str) -> (String, BookingService<InMemoryStore>) {
        let runtime = runtime();
        let service = service(&runtime);
        let mut output = Vec::new();
        let service = {
            let mut menu = Menu::new(
                runtime.handle().clone(),
                service,
                script.as_bytes(),
                &mut output,
            );
            menu.run().unwrap();
            menu.service
        };
        (String::from_utf8(output).unwrap(), service)
    }

    #[rstest]
    #[case::exit_option("9\n")]
    #[case::end_of_input("")]
    #[case::end_of_input_mid_prompt("1\nalice\n")]
    fn test_menu_exits(#[case] script: &str) {
        let (output, _) = run_script(script);
        assert!(output.starts_with("Running Train Booking System"));
        assert!(output.trim_end().ends_with("Goodbye!"));
    }

    #[rstest]
    #[case::not_a_number("abc\n9\n")]
    #[case::out_of_range("12\n9\n")]
    #[case::zero("0\n9\n")]
    fn test_invalid_option_is_reported(#[case] script: &str) {
        let (output, _) = run_script(script);
        assert!(output.contains("Please enter a number between 1 and 9"));
    }

    #[test]
    fn test_actions_need_login() {
        let (output, _) = run_script("3\n6\nsome-id\n9\n");
        assert_eq!(output.matches("Error: Please login first").count(), 2);
    }

    #[test]
    fn test_book_requires_selected_train() {
        let (output, _) = run_script("5\n9\n");
        assert!(output.contains("Please search and select a train first"));
    }

    #[test]
    fn test_full_booking_session() {
        let script = "1\nalice\npw\n2\nalice\npw\n4\nA\nC\n1\n5\n1\n0\n3\n9\n";
        let (output, service) = run_script(script);

        assert!(output.contains("User alice registered"));
        assert!(output.contains("Welcome alice"));
        assert!(output.contains("1. T1: A 08:00 -> C 10:00 (4/4 seats free)"));
        assert!(output.contains("0 0\n0 0\n"));
        assert!(output.contains("Booked! Enjoy your journey"));
        assert!(output.contains("ticket_id,train_id,row,col"));
        assert!(output.contains(",T1,1,0"));

        let user = service.current_user().unwrap();
        assert_eq!(user.tickets.len(), 1);
        assert_eq!((user.tickets[0].row, user.tickets[0].col), (1, 0));
    }

    #[rstest]
    #[case::negative_row("-1\n0\n", "'-1' is not a non-negative number")]
    #[case::out_of_bounds("5\n0\n", "outside the 2x2 seat grid")]
    fn test_bad_seat_input_is_reported(#[case] seat: &str, #[case] expected: &str) {
        let script = format!("1\nalice\npw\n2\nalice\npw\n4\nA\nC\n1\n5\n{}9\n", seat);
        let (output, service) = run_script(&script);

        assert!(output.contains(expected), "output was:\n{}", output);
        assert!(service.current_user().unwrap().tickets.is_empty());
    }

    #[test]
    fn test_search_without_results() {
        let (output, _) = run_script("4\nC\nA\n9\n");
        assert!(output.contains("No trains found from C to A"));
    }

    #[test]
    fn test_logout_and_report() {
        let (output, service) = run_script("7\n1\nbob\npw\n2\nbob\npw\n7\n8\n9\n");
        assert!(output.contains("You are not logged in"));
        assert!(output.contains("Logged out"));
        assert!(output.contains("Seat grids and tickets are consistent"));
        assert!(!service.is_authenticated());
    }
}
