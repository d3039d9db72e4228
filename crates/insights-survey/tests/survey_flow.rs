//! End-to-end survey scenarios against real and deliberately failing stores.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use insights_survey::{
    AnswerKey, Error, Event, MirroredStore, Page, ResponseRecord, ResponseStore, Result, Session,
    Storage,
};

/// Fails the first `failures` writes, then delegates to an in-memory store.
struct FlakyStore {
    inner: Storage,
    failures: AtomicUsize,
}

impl FlakyStore {
    fn failing(times: usize) -> Self {
        Self {
            inner: Storage::open_in_memory().expect("failed to create test storage"),
            failures: AtomicUsize::new(times),
        }
    }
}

impl ResponseStore for FlakyStore {
    fn persist(&self, record: &ResponseRecord) -> Result<i64> {
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(Error::internal("disk unavailable"));
        }
        self.inner.persist(record)
    }

    fn list_all(&self) -> Result<Vec<ResponseRecord>> {
        self.inner.list_all()
    }
}

fn fill_demographics(session: &mut Session) {
    session.record_answer(AnswerKey::Name, "Ana").unwrap();
    session.record_answer(AnswerKey::Age, 30).unwrap();
    session.record_answer(AnswerKey::Occupation, "Engineer").unwrap();
}

fn answer_all_questions(session: &mut Session) {
    for n in 1..=4u8 {
        session
            .record_answer(AnswerKey::Question(n), format!("answer {n}"))
            .unwrap();
    }
    for _ in 0..3 {
        session.next().unwrap();
        let page = session.page().index();
        // page 3 holds q5..q8, page 4 q9..q12, page 5 q13..q16
        let first = (page - 2) * 4 + 1;
        for n in first..first + 4 {
            session
                .record_answer(AnswerKey::Question(n), format!("answer {n}"))
                .unwrap();
        }
    }
}

#[test]
fn valid_demographics_advance_to_first_section() {
    let mut session = Session::new();
    session.start().unwrap();
    fill_demographics(&mut session);

    assert_eq!(session.next().unwrap(), Page::Section1);
    assert_eq!(session.page().index(), 2);
}

#[test]
fn empty_occupation_keeps_respondent_on_demographics() {
    let mut session = Session::new();
    session.start().unwrap();
    session.record_answer(AnswerKey::Name, "Ana").unwrap();
    session.record_answer(AnswerKey::Age, 30).unwrap();
    session.record_answer(AnswerKey::Occupation, "").unwrap();

    let err = session.next().unwrap_err();
    assert!(err.is_validation_error());
    assert_eq!(session.page().index(), 1);
}

#[test]
fn failed_submit_can_be_retried() {
    let store = FlakyStore::failing(1);
    let mut session = Session::new();
    session.start().unwrap();
    fill_demographics(&mut session);
    session.next().unwrap();
    answer_all_questions(&mut session);
    assert_eq!(session.page(), Page::Section4);

    let err = session.submit(&store).unwrap_err();
    assert!(err.is_persistence_error());
    assert_eq!(session.page().index(), 5);
    assert!(store.list_all().unwrap().is_empty());

    let id = session.submit(&store).unwrap();
    assert_eq!(session.page().index(), 6);

    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.id, Some(id));
    assert_eq!(record.respondent_id, session.respondent_id());
    assert_eq!(record.name, "Ana");
    assert_eq!(record.age, 30);
    assert_eq!(record.occupation, "Engineer");
    for n in 1..=16u8 {
        assert_eq!(record.question(n), Some(format!("answer {n}").as_str()));
    }
}

#[test]
fn submit_through_event_dispatch_reports_failure() {
    let store = FlakyStore::failing(2);
    let mut session = Session::new();
    session.handle(Event::Start, &store).unwrap();
    fill_demographics(&mut session);
    for _ in 0..4 {
        session.handle(Event::Next, &store).unwrap();
    }

    assert!(session.handle(Event::Submit, &store).is_err());
    assert!(session.handle(Event::Submit, &store).is_err());
    assert_eq!(session.page(), Page::Section4);
    assert_eq!(session.handle(Event::Submit, &store).unwrap(), Page::Complete);
    assert_eq!(store.list_all().unwrap().len(), 1);
}

#[test]
fn page_never_leaves_bounds() {
    let store = Storage::open_in_memory().unwrap();
    let mut session = Session::new();
    // A fixed pseudo-random walk over start/back/next, with demographics filled
    // part of the way through so both gated and ungated paths are taken.
    let mut seed: u32 = 0x2545_f491;
    for step in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 17;
        seed ^= seed << 5;
        let event = match seed % 3 {
            0 => Event::Back,
            1 => Event::Next,
            _ => Event::Start,
        };
        if step == 100 {
            fill_demographics(&mut session);
        }
        let _ = session.handle(event, &store);
        assert!(session.page().index() <= 6);
        assert!(session.page() != Page::Complete);
    }
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn reset_from_every_page_returns_to_intro() {
    let store = Storage::open_in_memory().unwrap();
    for target in Page::ALL {
        let mut session = Session::new();
        session.start().unwrap();
        fill_demographics(&mut session);
        while session.page() < target {
            if session.page() == Page::Intro {
                session.start().unwrap();
            } else if session.page() == Page::Section4 {
                session.submit(&store).unwrap();
            } else {
                session.next().unwrap();
            }
        }
        if target == Page::Intro {
            session.back().unwrap();
        }
        assert_eq!(session.page(), target);

        let before = session.respondent_id();
        session.reset();
        assert_eq!(session.page(), Page::Intro);
        assert!(session.answers().is_empty());
        assert_ne!(session.respondent_id(), before);
    }
}

#[test]
fn concurrent_sessions_share_one_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(MirroredStore::new(
        Storage::open(dir.path().join("responses.db")).unwrap(),
        Some(insights_survey::CsvMirror::new(dir.path().join("mirror"))),
    ));

    let handles: Vec<_> = (0..6u32)
        .map(|i| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                let mut session = Session::new();
                session.start().unwrap();
                session
                    .record_answer(AnswerKey::Name, format!("Respondent {i}"))
                    .unwrap();
                session.record_answer(AnswerKey::Age, 20 + i).unwrap();
                session.record_answer(AnswerKey::Occupation, "Tester").unwrap();
                for _ in 0..4 {
                    session.next().unwrap();
                }
                session.submit(&*store).unwrap();
                session.respondent_id()
            })
        })
        .collect();

    let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let mut stored: Vec<_> = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|r| r.respondent_id)
        .collect();
    ids.sort();
    stored.sort();
    assert_eq!(ids, stored);
}

#[test]
fn responses_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responses.db");

    let respondent = {
        let store = Storage::open(&path).unwrap();
        let mut session = Session::new();
        session.start().unwrap();
        fill_demographics(&mut session);
        for _ in 0..4 {
            session.next().unwrap();
        }
        session.submit(&store).unwrap();
        session.respondent_id()
    };

    let store = Storage::open(&path).unwrap();
    let records = store.list_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].respondent_id, respondent);
}
