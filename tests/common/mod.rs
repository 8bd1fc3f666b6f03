//! Shared in-memory fakes for engine, poller, and web tests.
//!
//! Both fakes write into a shared journal so tests can assert the
//! store-write → publish → acknowledge ordering of a transition.
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use command_core::error::{CommandCoreError, Result};
use command_core::messaging::{QueueClient, QueueMessage};
use command_core::models::{Command, CommandStatus, CommandStore};

pub type Journal = Arc<Mutex<Vec<&'static str>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn journal_entries(journal: &Journal) -> Vec<&'static str> {
    journal.lock().unwrap().clone()
}

/// In-memory record store recording every mutation in the journal.
pub struct InMemoryCommandStore {
    records: Mutex<HashMap<Uuid, Command>>,
    journal: Journal,
    pub fail_writes: AtomicBool,
}

impl InMemoryCommandStore {
    pub fn new(journal: Journal) -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            journal,
            fail_writes: AtomicBool::new(false),
        }
    }

    pub fn seed(&self, command: Command) {
        self.records.lock().unwrap().insert(command.id, command);
    }

    pub fn get(&self, id: Uuid) -> Option<Command> {
        self.records.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    fn check_writes(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CommandCoreError::Database(
                "simulated store failure".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandStore for InMemoryCommandStore {
    async fn put(&self, command: &Command) -> Result<()> {
        self.check_writes()?;
        self.records
            .lock()
            .unwrap()
            .insert(command.id, command.clone());
        self.journal.lock().unwrap().push("store.put");
        Ok(())
    }

    async fn update_status(&self, id: Uuid, status: CommandStatus) -> Result<bool> {
        self.check_writes()?;
        let mut records = self.records.lock().unwrap();
        let matched = match records.get_mut(&id) {
            Some(record) => {
                record.status = status;
                true
            }
            None => false,
        };
        self.journal.lock().unwrap().push("store.update_status");
        Ok(matched)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.check_writes()?;
        self.records.lock().unwrap().remove(&id);
        self.journal.lock().unwrap().push("store.delete");
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<Command>> {
        let mut commands: Vec<Command> = self.records.lock().unwrap().values().cloned().collect();
        commands.sort_by_key(|c| c.date);
        Ok(commands)
    }
}

/// In-memory queue transport recording sends and acknowledgments.
pub struct InMemoryQueueClient {
    inbound: Mutex<VecDeque<QueueMessage>>,
    pub sent: Mutex<Vec<(String, Value)>>,
    pub deleted: Mutex<Vec<(String, i64)>>,
    journal: Journal,
    pub fail_sends: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl InMemoryQueueClient {
    pub fn new(journal: Journal) -> Self {
        Self {
            inbound: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            journal,
            fail_sends: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    pub fn push_inbound(&self, msg_id: i64, body: Value) {
        self.inbound
            .lock()
            .unwrap()
            .push_back(QueueMessage { msg_id, body });
    }

    pub fn sent_events(&self) -> Vec<Value> {
        self.sent.lock().unwrap().iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn acked_ids(&self) -> Vec<i64> {
        self.deleted.lock().unwrap().iter().map(|(_, id)| *id).collect()
    }
}

#[async_trait]
impl QueueClient for InMemoryQueueClient {
    async fn create_queue(&self, _queue_name: &str) -> Result<()> {
        Ok(())
    }

    async fn send_json_message(&self, queue_name: &str, message: &Value) -> Result<i64> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(CommandCoreError::Messaging(
                "simulated send failure".to_string(),
            ));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((queue_name.to_string(), message.clone()));
        self.journal.lock().unwrap().push("queue.send");
        Ok(sent.len() as i64)
    }

    async fn read_messages(
        &self,
        _queue_name: &str,
        _visibility_timeout: Option<i32>,
        limit: Option<i32>,
    ) -> Result<Vec<QueueMessage>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(CommandCoreError::Messaging(
                "simulated receive failure".to_string(),
            ));
        }
        let mut inbound = self.inbound.lock().unwrap();
        let take = limit.map_or(1, |l| l.max(0) as usize);
        let mut batch = Vec::new();
        while batch.len() < take {
            match inbound.pop_front() {
                Some(msg) => batch.push(msg),
                None => break,
            }
        }
        Ok(batch)
    }

    async fn delete_message(&self, queue_name: &str, msg_id: i64) -> Result<()> {
        self.deleted
            .lock()
            .unwrap()
            .push((queue_name.to_string(), msg_id));
        self.journal.lock().unwrap().push("queue.delete");
        Ok(())
    }
}
