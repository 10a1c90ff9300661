//! The custody engine: both registries behind one authorization gate.

use libreg_gate::{
    AuthorizationGate, GateConfig, GateContext, GateStage, Operation, Proposal, RejectionKind,
    Verdict,
};
use libreg_types::{BookName, BookView, Condition, Identity};

use crate::books::BookRegistry;
use crate::error::{LibraryError, Result};
use crate::journal::{Journal, LibraryEvent, Receipt};
use crate::librarians::LibrarianRegistry;

/// What a successful [`Library::toggle_book`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BookToggle {
    Registered,
    Removed,
}

/// A library: the librarian table, the book table, the gate that guards
/// them, and the journal of committed changes.
///
/// Every mutating call goes through the same path: build a [`GateContext`]
/// from the tables, run the gate, prepare the receipt, and only then write.
/// A call that returns `Err` has changed nothing.
pub struct Library {
    librarians: LibrarianRegistry,
    books: BookRegistry,
    gate: AuthorizationGate,
    journal: Journal,
}

impl Library {
    /// A library with the default gate, whose only librarian is `creator`.
    pub fn genesis(creator: Identity) -> Self {
        Self::with_config(creator, GateConfig::default())
    }

    /// A library with the default stages configured by `config`.
    pub fn with_config(creator: Identity, config: GateConfig) -> Self {
        tracing::info!(creator = %creator, ?config, "library created");
        Self {
            librarians: LibrarianRegistry::genesis(creator),
            books: BookRegistry::new(),
            gate: AuthorizationGate::with_default_stages(config),
            journal: Journal::new(),
        }
    }

    /// Append an extra stage after the built-in ones.
    ///
    /// Extra stages can only narrow what the built-in stages allow.
    pub fn add_stage(&mut self, stage: Box<dyn GateStage>) {
        self.gate.add_stage(stage);
    }

    pub fn config(&self) -> &GateConfig {
        self.gate.config()
    }

    // -- librarians ---------------------------------------------------------

    pub fn is_librarian(&self, identity: &Identity) -> bool {
        self.librarians.is_librarian(identity)
    }

    /// Current librarians, sorted.
    pub fn librarians(&self) -> Vec<Identity> {
        self.librarians.librarians()
    }

    /// Flip the librarian flag of `target`. Returns the new flag.
    ///
    /// The caller must currently be a librarian.
    pub fn toggle_librarian(&mut self, target: &Identity, caller: &Identity) -> Result<bool> {
        self.submit(
            caller,
            Operation::ToggleLibrarian {
                target: target.clone(),
            },
        )?;
        Ok(self.librarians.is_librarian(target))
    }

    // -- books --------------------------------------------------------------

    pub fn is_valid_book(&self, name: &str) -> bool {
        self.books.is_valid_book(name)
    }

    pub fn owner_of(&self, name: &str) -> Result<Identity> {
        self.books.owner_of(name)
    }

    pub fn condition_of(&self, name: &str) -> Result<Condition> {
        self.books.condition_of(name)
    }

    pub fn book(&self, name: &str) -> Option<BookView> {
        self.books.view(name)
    }

    /// All registered books, sorted by name.
    pub fn books(&self) -> Vec<BookView> {
        self.books.views()
    }

    /// Register `name` (held by `caller`, in good condition) if it is
    /// absent, or remove it if it is present.
    pub fn toggle_book(&mut self, name: &BookName, caller: &Identity) -> Result<BookToggle> {
        let was_registered = self.books.is_valid_book(name.as_str());
        self.submit(caller, Operation::ToggleBook { name: name.clone() })?;
        Ok(if was_registered {
            BookToggle::Removed
        } else {
            BookToggle::Registered
        })
    }

    /// Hand `name` to `new_owner` and record `new_condition`.
    ///
    /// Checked in order: the book exists, `caller` holds it (or is a
    /// librarian with the override enabled), and the condition is not being
    /// raised from damaged to good.
    pub fn transfer_custody(
        &mut self,
        name: &BookName,
        new_owner: &Identity,
        new_condition: Condition,
        caller: &Identity,
    ) -> Result<()> {
        self.submit(
            caller,
            Operation::TransferCustody {
                name: name.clone(),
                new_owner: new_owner.clone(),
                new_condition,
            },
        )
    }

    // -- journal ------------------------------------------------------------

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    // -- engine -------------------------------------------------------------

    /// Gate, prepare, then commit a single operation.
    fn submit(&mut self, caller: &Identity, operation: Operation) -> Result<()> {
        let context = GateContext::new(
            self.librarians.is_librarian(caller),
            operation.book().and_then(|name| self.books.view(name.as_str())),
        );
        let proposal = Proposal::new(caller.clone(), operation);
        let result = self.gate.evaluate(&proposal, context)?;

        if let Verdict::Rejected { kind, reason } = result.verdict {
            return Err(rejection(kind, reason, &proposal.operation));
        }

        let event = self.event_for(&proposal)?;
        let receipt = self.journal.prepare(proposal.caller, event)?;
        self.apply(&receipt);
        self.journal.push(receipt);
        Ok(())
    }

    /// Describe what an accepted proposal will change.
    fn event_for(&self, proposal: &Proposal) -> Result<LibraryEvent> {
        let event = match &proposal.operation {
            Operation::ToggleLibrarian { target } => LibraryEvent::LibrarianToggled {
                target: target.clone(),
                is_librarian: !self.librarians.is_librarian(target),
            },
            Operation::ToggleBook { name } if self.books.is_valid_book(name.as_str()) => {
                LibraryEvent::BookRemoved { name: name.clone() }
            }
            Operation::ToggleBook { name } => LibraryEvent::BookRegistered {
                name: name.clone(),
                owner: proposal.caller.clone(),
            },
            Operation::TransferCustody {
                name,
                new_owner,
                new_condition,
            } => LibraryEvent::CustodyTransferred {
                name: name.clone(),
                from: self.books.owner_of(name.as_str())?,
                to: new_owner.clone(),
                condition: *new_condition,
            },
        };
        Ok(event)
    }

    fn apply(&mut self, receipt: &Receipt) {
        match &receipt.event {
            LibraryEvent::LibrarianToggled { target, is_librarian } => {
                self.librarians.toggle(target);
                tracing::info!(seq = receipt.seq, %target, is_librarian, "librarian toggled");
            }
            LibraryEvent::BookRegistered { name, owner } => {
                self.books.register(name.clone(), owner.clone());
                tracing::info!(seq = receipt.seq, book = %name, %owner, "book registered");
            }
            LibraryEvent::BookRemoved { name } => {
                self.books.remove(name.as_str());
                tracing::info!(seq = receipt.seq, book = %name, "book removed");
            }
            LibraryEvent::CustodyTransferred {
                name,
                from,
                to,
                condition,
            } => {
                self.books.set_custody(name.as_str(), to.clone(), *condition);
                tracing::info!(
                    seq = receipt.seq,
                    book = %name,
                    %from,
                    %to,
                    %condition,
                    "custody transferred"
                );
            }
        }
    }
}

fn rejection(kind: RejectionKind, reason: String, operation: &Operation) -> LibraryError {
    match kind {
        RejectionKind::Unauthorized => LibraryError::Unauthorized(reason),
        RejectionKind::NotFound => LibraryError::NotFound(
            operation
                .book()
                .map(|name| name.to_string())
                .unwrap_or(reason),
        ),
        RejectionKind::StateConsistency => LibraryError::StateConsistency(reason),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libreg_gate::{RegistrationPolicy, StageDecision};

    fn name(s: &str) -> BookName {
        BookName::new(s)
    }

    #[test]
    fn genesis_librarian_can_promote() {
        let head = Identity::from_label("head");
        let clerk = Identity::from_label("clerk");
        let mut library = Library::genesis(head.clone());
        assert!(library.toggle_librarian(&clerk, &head).unwrap());
        assert!(library.is_librarian(&clerk));
        assert_eq!(library.journal().len(), 1);
    }

    #[test]
    fn non_librarian_cannot_promote_itself() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let mut library = Library::genesis(head);
        let err = library.toggle_librarian(&patron, &patron).unwrap_err();
        assert_eq!(err.kind(), Some(RejectionKind::Unauthorized));
        assert!(!library.is_librarian(&patron));
        assert!(library.journal().is_empty());
    }

    #[test]
    fn demoted_librarian_loses_authority() {
        let head = Identity::from_label("head");
        let clerk = Identity::from_label("clerk");
        let mut library = Library::genesis(head.clone());
        library.toggle_librarian(&clerk, &head).unwrap();
        library.toggle_librarian(&head, &clerk).unwrap();
        assert!(!library.is_librarian(&head));
        assert!(library.toggle_librarian(&clerk, &head).is_err());
    }

    #[test]
    fn toggle_book_reports_direction() {
        let head = Identity::from_label("head");
        let mut library = Library::genesis(head.clone());
        assert_eq!(
            library.toggle_book(&name("Clifford"), &head).unwrap(),
            BookToggle::Registered
        );
        assert_eq!(
            library.toggle_book(&name("Clifford"), &head).unwrap(),
            BookToggle::Removed
        );
        assert!(!library.is_valid_book("Clifford"));
    }

    #[test]
    fn any_caller_may_remove_a_book_under_open_registration() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let mut library = Library::genesis(head.clone());
        library.toggle_book(&name("Clifford"), &head).unwrap();
        library.toggle_book(&name("Clifford"), &patron).unwrap();
        assert!(!library.is_valid_book("Clifford"));
    }

    #[test]
    fn librarian_only_registration() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let mut library = Library::with_config(
            head.clone(),
            GateConfig {
                book_registration: RegistrationPolicy::LibrarianOnly,
                ..GateConfig::default()
            },
        );
        let err = library.toggle_book(&name("Clifford"), &patron).unwrap_err();
        assert!(matches!(err, LibraryError::Unauthorized(_)));
        assert!(!library.is_valid_book("Clifford"));

        library.toggle_book(&name("Clifford"), &head).unwrap();
        assert_eq!(library.owner_of("Clifford").unwrap(), head);
    }

    #[test]
    fn resurrected_book_belongs_to_new_registrant() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let mut library = Library::genesis(head.clone());
        let clifford = name("Clifford");
        library.toggle_book(&clifford, &head).unwrap();
        library
            .transfer_custody(&clifford, &head, Condition::Damaged, &head)
            .unwrap();
        library.toggle_book(&clifford, &head).unwrap();
        library.toggle_book(&clifford, &patron).unwrap();
        assert_eq!(library.owner_of("Clifford").unwrap(), patron);
        assert_eq!(library.condition_of("Clifford").unwrap(), Condition::Good);
    }

    #[test]
    fn transfer_of_missing_book_names_the_book() {
        let head = Identity::from_label("head");
        let mut library = Library::genesis(head.clone());
        let err = library
            .transfer_custody(&name("Clifford"), &head, Condition::Good, &head)
            .unwrap_err();
        match err {
            LibraryError::NotFound(book) => assert_eq!(book, "Clifford"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn librarian_override_is_opt_in() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let clifford = name("Clifford");

        let mut strict = Library::genesis(head.clone());
        strict.toggle_book(&clifford, &patron).unwrap();
        assert!(strict
            .transfer_custody(&clifford, &head, Condition::Good, &head)
            .is_err());

        let mut lenient = Library::with_config(
            head.clone(),
            GateConfig {
                librarian_override: true,
                ..GateConfig::default()
            },
        );
        lenient.toggle_book(&clifford, &patron).unwrap();
        lenient
            .transfer_custody(&clifford, &head, Condition::Good, &head)
            .unwrap();
        assert_eq!(lenient.owner_of("Clifford").unwrap(), head);
    }

    #[test]
    fn extra_stage_can_veto() {
        struct FrozenCatalogue;
        impl GateStage for FrozenCatalogue {
            fn name(&self) -> &str {
                "frozen"
            }
            fn evaluate(
                &self,
                proposal: &Proposal,
                _context: &GateContext,
            ) -> std::result::Result<StageDecision, libreg_gate::GateError> {
                match proposal.operation {
                    Operation::ToggleBook { .. } => Ok(StageDecision::fail(
                        RejectionKind::Unauthorized,
                        "catalogue is frozen",
                    )),
                    _ => Ok(StageDecision::Pass),
                }
            }
        }

        let head = Identity::from_label("head");
        let mut library = Library::genesis(head.clone());
        library.add_stage(Box::new(FrozenCatalogue));
        let err = library.toggle_book(&name("Clifford"), &head).unwrap_err();
        assert!(err.to_string().contains("frozen"));
        assert!(library.books().is_empty());
    }

    #[test]
    fn journal_records_transfer_provenance() {
        let head = Identity::from_label("head");
        let patron = Identity::from_label("patron");
        let mut library = Library::genesis(head.clone());
        let clifford = name("Clifford");
        library.toggle_book(&clifford, &head).unwrap();
        library
            .transfer_custody(&clifford, &patron, Condition::Good, &head)
            .unwrap();

        let head_receipt = library.journal().head().unwrap();
        assert_eq!(head_receipt.seq, 2);
        assert_eq!(
            head_receipt.event,
            LibraryEvent::CustodyTransferred {
                name: clifford,
                from: head.clone(),
                to: patron,
                condition: Condition::Good,
            }
        );
        assert_eq!(head_receipt.caller, head);
        assert!(library.journal().verify().is_ok());
    }
}
