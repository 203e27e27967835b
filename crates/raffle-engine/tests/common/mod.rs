#![allow(dead_code)]

use std::sync::Arc;

use raffle_core::{Timestamp, UserId};
use raffle_engine::{CreateRaffle, CreateUser, EntropySource, RaffleService};
use raffle_store::{MemoryStore, Raffle, RaffleConfiguration, RaffleMetadata, UserRole};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub service: RaffleService,
}

impl Harness {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        let store = Arc::new(MemoryStore::new());
        let service = RaffleService::with_store(store.clone(), entropy);
        Self { store, service }
    }

    pub fn user(&self, email: &str, role: UserRole) -> UserId {
        self.service
            .create_user(CreateUser {
                email: email.to_string(),
                name: email.split('@').next().unwrap_or("user").to_string(),
                role,
            })
            .unwrap()
            .id
    }

    pub fn raffle(&self, configuration: RaffleConfiguration) -> Raffle {
        let creator = self.user(
            &format!("creator-{}@example.com", UserId::new()),
            UserRole::Creator,
        );
        self.service
            .create_raffle(CreateRaffle {
                creator_id: creator,
                metadata: RaffleMetadata {
                    title: "Charity draw".to_string(),
                    description: Some("Proceeds go to the shelter".to_string()),
                    images: vec!["https://img.example.com/prize.png".to_string()],
                    is_paid: false,
                    price_cents: None,
                    raffle_date: Timestamp::now(),
                    raffle_time: Some("18:30".to_string()),
                },
                configuration,
            })
            .unwrap()
    }

    pub fn active_raffle(&self, configuration: RaffleConfiguration) -> Raffle {
        let raffle = self.raffle(configuration);
        self.service.activate_raffle(raffle.id).unwrap()
    }
}
