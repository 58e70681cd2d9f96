//! Aggregate root for the Narrative context.

use mechdeck_core::clock::Clock;
use mechdeck_core::error::DomainError;
use mechdeck_core::event::EventMetadata;
use mechdeck_core::repository::ProgressRecord;
use mechdeck_core::reward::RewardIntent;
use mechdeck_core::value::Variables;
use tracing::warn;
use uuid::Uuid;

use super::conditions::is_choice_visible;
use super::events::{NarrativeEvent, NarrativeEventKind};
use super::story::{Action, Choice, Node, Story};
use super::template::substitute;

/// One player's position in one story.
///
/// All mutation goes through [`StorySession::make_choice`], which either
/// applies a whole transition or leaves the session untouched.
#[derive(Debug, Clone)]
pub struct StorySession {
    user_id: Uuid,
    story: Story,
    current_node_id: String,
    variables: Variables,
    pending_rewards: Vec<RewardIntent>,
    uncommitted_events: Vec<NarrativeEvent>,
}

/// Effects of a transition that has not been committed yet.
#[derive(Debug)]
struct Staged {
    variables: Variables,
    events: Vec<NarrativeEventKind>,
    rewards: Vec<RewardIntent>,
}

impl Staged {
    fn apply(&mut self, action: &Action) {
        match action {
            Action::SetVariable { name, value } => {
                let previous = self.variables.insert(name.clone(), value.clone());
                self.events.push(NarrativeEventKind::VariableSet {
                    name: name.clone(),
                    value: value.clone(),
                    previous,
                });
            }
            Action::RewardCard { card_id, rarity } => self.queue(RewardIntent::Card {
                card_id: card_id.clone(),
                rarity: rarity.clone(),
            }),
            Action::ForceEquipment { slot, card_id } => self.queue(RewardIntent::Equipment {
                card_id: card_id.clone(),
                slot: Some(slot.clone()),
                auto_equip: true,
            }),
            Action::NarrativeAudio { event, text } => {
                self.events.push(NarrativeEventKind::NarrativeCue {
                    event: event.clone(),
                    text: substitute(text, &self.variables),
                });
            }
            Action::GrantReward { reward } => self.queue(reward.clone()),
        }
    }

    fn queue(&mut self, reward: RewardIntent) {
        self.events.push(NarrativeEventKind::RewardQueued {
            reward: reward.clone(),
        });
        self.rewards.push(reward);
    }
}

impl StorySession {
    /// Starts a fresh playthrough at the story's start node with its default
    /// variables. Entry actions of the start node do not run.
    #[must_use]
    pub fn start(user_id: Uuid, story: Story) -> Self {
        Self {
            user_id,
            current_node_id: story.start_node_id.clone(),
            variables: story.variables.clone(),
            story,
            pending_rewards: Vec::new(),
            uncommitted_events: Vec::new(),
        }
    }

    /// Resumes from saved progress.
    ///
    /// Saved variables are layered over the story defaults. A record whose
    /// node no longer exists restarts the story from scratch.
    #[must_use]
    pub fn resume(user_id: Uuid, story: Story, record: &ProgressRecord) -> Self {
        if story.node(&record.current_node_id).is_none() {
            warn!(
                %user_id,
                story_id = %story.id,
                node_id = %record.current_node_id,
                "saved node no longer exists; restarting story"
            );
            return Self::start(user_id, story);
        }

        let mut session = Self::start(user_id, story);
        session.current_node_id.clone_from(&record.current_node_id);
        session.variables.extend(record.variables.clone());
        session
    }

    /// The player.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// The story being played.
    #[must_use]
    pub fn story(&self) -> &Story {
        &self.story
    }

    /// Id of the node the player is at.
    #[must_use]
    pub fn current_node_id(&self) -> &str {
        &self.current_node_id
    }

    /// The node the player is at, if the story still has it.
    #[must_use]
    pub fn current_node(&self) -> Option<&Node> {
        self.story.node(&self.current_node_id)
    }

    /// Current variable snapshot.
    #[must_use]
    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Choices at the current node whose conditions hold, in authored order.
    #[must_use]
    pub fn visible_choices(&self) -> Vec<&Choice> {
        self.current_node()
            .map(|node| {
                node.choices
                    .iter()
                    .filter(|choice| is_choice_visible(choice, &self.variables))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Takes the `choice_index`-th visible choice.
    ///
    /// Runs the choice's actions, moves to its target and runs the target's
    /// entry actions, recording every effect as an uncommitted event.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidChoice` if the index is outside the
    /// visible choice list and `DomainError::InvalidTarget` if the choice
    /// points at a missing node. The session is unchanged on error.
    pub fn make_choice(
        &mut self,
        choice_index: usize,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> Result<(), DomainError> {
        let choice = {
            let visible = self.visible_choices();
            visible
                .get(choice_index)
                .map(|choice| (*choice).clone())
                .ok_or(DomainError::InvalidChoice {
                    index: choice_index,
                    visible: visible.len(),
                })?
        };

        let Some(target) = self.story.node(&choice.target) else {
            return Err(DomainError::InvalidTarget(choice.target));
        };

        let mut staged = Staged {
            variables: self.variables.clone(),
            events: Vec::new(),
            rewards: Vec::new(),
        };
        for action in &choice.actions {
            staged.apply(action);
        }
        staged.events.push(NarrativeEventKind::NodeEntered {
            from_node_id: self.current_node_id.clone(),
            to_node_id: target.id.clone(),
            choice_index,
        });
        for action in &target.actions {
            staged.apply(action);
        }

        self.current_node_id.clone_from(&choice.target);
        self.variables = staged.variables;
        self.pending_rewards.extend(staged.rewards);
        for kind in staged.events {
            self.record(kind, correlation_id, clock);
        }
        Ok(())
    }

    #[allow(clippy::cast_possible_wrap)]
    fn next_sequence_number(&self) -> i64 {
        self.uncommitted_events.len() as i64 + 1
    }

    fn record(&mut self, kind: NarrativeEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = NarrativeEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                user_id: self.user_id,
                story_id: self.story.id.clone(),
                sequence_number: self.next_sequence_number(),
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.uncommitted_events.push(event);
    }

    /// Drains the reward intents queued since the last call.
    pub fn take_pending_rewards(&mut self) -> Vec<RewardIntent> {
        std::mem::take(&mut self.pending_rewards)
    }

    /// Events produced since the last clear.
    #[must_use]
    pub fn uncommitted_events(&self) -> &[NarrativeEvent] {
        &self.uncommitted_events
    }

    /// Clears the uncommitted event list.
    pub fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }

    /// Snapshot for the progress store.
    #[must_use]
    pub fn to_progress_record(&self, clock: &dyn Clock) -> ProgressRecord {
        ProgressRecord {
            user_id: self.user_id,
            story_id: self.story.id.clone(),
            current_node_id: self.current_node_id.clone(),
            variables: self.variables.clone(),
            last_updated: clock.now(),
        }
    }
}
