//! # System Scheduler
//!
//! Holds the ordered list of registered systems and keeps each system's
//! entity list in step with entity signatures.
//!
//! ## Membership
//!
//! The [`World`](super::World) records every signature change. The scheduler
//! drains that record in [`Scheduler::sync`] and re-evaluates membership of
//! each changed entity against every system, in registration order. Hooks
//! that mutate components record further changes, which the same `sync`
//! call keeps draining until the record is empty.
//!
//! ## Dispatch
//!
//! [`Scheduler::run_phase`] syncs, then calls each system in registration
//! order with its entity list (registration order, not sorted), syncing again
//! after every callback. A component added inside a callback is therefore
//! visible to every later system of the same phase.

use tracing::debug;

use super::entity::EntityId;
use super::signature::Signature;
use super::system::{Phase, System};
use super::world::EcsContext;
use crate::error::{EcsError, EcsResult};

/// Counters for one phase dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseStats {
    /// Systems invoked.
    pub systems_run: usize,
    /// Sum of entity list lengths handed to systems.
    pub entities_dispatched: usize,
    /// Registration hooks fired while syncing.
    pub registrations: usize,
    /// Unregistration hooks fired while syncing.
    pub unregistrations: usize,
}

struct SystemSlot<C> {
    name: String,
    signature: Signature,
    entities: Vec<EntityId>,
    behavior: Box<dyn System<C>>,
}

impl<C> SystemSlot<C> {
    fn matches(&self, signature: Option<Signature>) -> bool {
        // An entity with no components belongs to no system.
        signature.is_some_and(|sig| !sig.is_empty() && sig.satisfies(self.signature))
    }

    fn position(&self, entity: EntityId) -> Option<usize> {
        self.entities.iter().position(|&e| e == entity)
    }
}

/// Ordered system registry and phase dispatcher.
///
/// # Example
///
/// ```rust,ignore
/// let mut scheduler = Scheduler::<World>::new();
/// scheduler.register_system(&mut world, "movement", Signature::of(&[pos.id()]), Movement)?;
/// scheduler.run_phase(&mut world, Phase::Update, 0.016);
/// ```
pub struct Scheduler<C> {
    systems: Vec<SystemSlot<C>>,
    /// Reused buffer for drained signature changes.
    pending: Vec<EntityId>,
    /// Hook counters accumulated since the last dispatch.
    registrations: usize,
    unregistrations: usize,
}

impl<C: EcsContext> Scheduler<C> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            systems: Vec::new(),
            pending: Vec::new(),
            registrations: 0,
            unregistrations: 0,
        }
    }

    /// Registers a system after all previously registered ones.
    ///
    /// Pending signature changes are applied first, then every live entity
    /// already matching `signature` joins the new system (in index order) and
    /// its registration hook fires.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::DuplicateSystem`] if `name` is taken.
    pub fn register_system<S>(
        &mut self,
        ctx: &mut C,
        name: impl Into<String>,
        signature: Signature,
        system: S,
    ) -> EcsResult<()>
    where
        S: System<C> + 'static,
    {
        let name = name.into();
        if self.systems.iter().any(|slot| slot.name == name) {
            return Err(EcsError::DuplicateSystem(name));
        }
        self.sync(ctx);

        debug!(system = %name, signature = signature.bits(), "registered system");
        self.systems.push(SystemSlot {
            name,
            signature,
            entities: Vec::new(),
            behavior: Box::new(system),
        });

        let index = self.systems.len() - 1;
        let existing: Vec<EntityId> = ctx.world().iter_alive().map(|e| e.id).collect();
        for entity in existing {
            let signature = ctx.world().signature(entity);
            let slot = &mut self.systems[index];
            if slot.matches(signature) {
                slot.entities.push(entity);
                slot.behavior.on_entity_registered(ctx, entity);
                self.registrations += 1;
            }
        }
        self.sync(ctx);
        Ok(())
    }

    /// Applies every recorded signature change to system membership.
    ///
    /// Fires registration hooks for systems an entity starts matching and
    /// unregistration hooks for systems it stops matching, system by system
    /// in registration order.
    pub fn sync(&mut self, ctx: &mut C) {
        loop {
            ctx.world_mut().drain_signature_changes(&mut self.pending);
            if self.pending.is_empty() {
                return;
            }
            let changed = std::mem::take(&mut self.pending);
            for &entity in &changed {
                self.refresh_entity(ctx, entity);
            }
            // Keep the allocation
            self.pending = changed;
            self.pending.clear();
        }
    }

    fn refresh_entity(&mut self, ctx: &mut C, entity: EntityId) {
        for slot in &mut self.systems {
            // Re-read per system: a hook may have changed the signature.
            let signature = ctx.world().signature(entity);
            let matches = slot.matches(signature);
            match (matches, slot.position(entity)) {
                (true, None) => {
                    debug!(system = %slot.name, entity = ?entity, "entity registered");
                    slot.entities.push(entity);
                    slot.behavior.on_entity_registered(ctx, entity);
                    self.registrations += 1;
                }
                (false, Some(position)) => {
                    debug!(system = %slot.name, entity = ?entity, "entity unregistered");
                    slot.entities.remove(position);
                    slot.behavior.on_entity_unregistered(ctx, entity);
                    self.unregistrations += 1;
                }
                _ => {}
            }
        }
    }

    /// Runs one phase over every system in registration order.
    pub fn run_phase(&mut self, ctx: &mut C, phase: Phase, delta: f32) -> PhaseStats {
        self.sync(ctx);
        let mut stats = PhaseStats::default();

        for index in 0..self.systems.len() {
            {
                let SystemSlot {
                    entities, behavior, ..
                } = &mut self.systems[index];
                stats.systems_run += 1;
                stats.entities_dispatched += entities.len();
                match phase {
                    Phase::FixedUpdate => behavior.fixed_update(ctx, entities, delta),
                    Phase::Update => behavior.update(ctx, entities, delta),
                    Phase::Render => behavior.render(ctx, entities),
                }
            }
            self.sync(ctx);
        }

        stats.registrations = std::mem::take(&mut self.registrations);
        stats.unregistrations = std::mem::take(&mut self.unregistrations);
        stats
    }

    /// Returns the entity list of a system, in registration order.
    #[must_use]
    pub fn system_entities(&self, name: &str) -> Option<&[EntityId]> {
        self.systems
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.entities.as_slice())
    }

    /// Returns the required signature of a system.
    #[must_use]
    pub fn system_signature(&self, name: &str) -> Option<Signature> {
        self.systems
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.signature)
    }

    /// Iterates over system names in registration order.
    pub fn system_names(&self) -> impl Iterator<Item = &str> {
        self.systems.iter().map(|slot| slot.name.as_str())
    }

    /// Returns the number of registered systems.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.systems.len()
    }

    /// Checks if no system is registered.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

impl<C: EcsContext> Default for Scheduler<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::ecs::{Component, ComponentType, SystemTemplate, World};

    struct A;
    impl Component for A {}
    struct B;
    impl Component for B {}

    fn setup() -> (World, ComponentType<A>, ComponentType<B>) {
        let mut world = World::default();
        let a = world.register_component_type::<A>().unwrap();
        let b = world.register_component_type::<B>().unwrap();
        (world, a, b)
    }

    #[test]
    fn test_membership_follows_signature() {
        let (mut world, a, b) = setup();
        let mut scheduler = Scheduler::new();
        scheduler
            .register_system(&mut world, "ab", Signature::of(&[a.id(), b.id()]), SystemTemplate::new())
            .unwrap();

        let entity = world.create_entity().unwrap();
        world.set_component(entity, a, A).unwrap();
        scheduler.sync(&mut world);
        assert_eq!(scheduler.system_entities("ab"), Some(&[][..]));

        world.set_component(entity, b, B).unwrap();
        scheduler.sync(&mut world);
        assert_eq!(scheduler.system_entities("ab"), Some(&[entity][..]));

        world.remove_component(entity, a);
        scheduler.sync(&mut world);
        assert_eq!(scheduler.system_entities("ab"), Some(&[][..]));
    }

    #[test]
    fn test_duplicate_system_rejected() {
        let (mut world, a, _) = setup();
        let mut scheduler = Scheduler::new();
        let sig = Signature::of(&[a.id()]);
        scheduler
            .register_system(&mut world, "s", sig, SystemTemplate::new())
            .unwrap();
        assert_eq!(
            scheduler.register_system(&mut world, "s", sig, SystemTemplate::new()),
            Err(EcsError::DuplicateSystem("s".into()))
        );
    }

    #[test]
    fn test_hooks_fire_once() {
        let (mut world, a, _) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (reg, unreg) = (Rc::clone(&log), Rc::clone(&log));

        let mut scheduler = Scheduler::new();
        scheduler
            .register_system(
                &mut world,
                "hooks",
                Signature::of(&[a.id()]),
                SystemTemplate::new()
                    .with_on_entity_registered(move |_, e| reg.borrow_mut().push(("reg", e)))
                    .with_on_entity_unregistered(move |_, e| unreg.borrow_mut().push(("unreg", e))),
            )
            .unwrap();

        let entity = world.create_entity().unwrap();
        world.set_component(entity, a, A).unwrap();
        world.set_component(entity, a, A).unwrap();
        scheduler.sync(&mut world);
        world.destroy_entity(entity);
        scheduler.sync(&mut world);

        assert_eq!(*log.borrow(), vec![("reg", entity), ("unreg", entity)]);
    }

    #[test]
    fn test_existing_entities_join_new_system() {
        let (mut world, a, _) = setup();
        let first = world.create_entity().unwrap();
        let second = world.create_entity().unwrap();
        world.set_component(second, a, A).unwrap();
        world.set_component(first, a, A).unwrap();

        let mut scheduler = Scheduler::new();
        scheduler
            .register_system(&mut world, "late", Signature::of(&[a.id()]), SystemTemplate::new())
            .unwrap();
        assert_eq!(scheduler.system_entities("late"), Some(&[first, second][..]));
    }

    #[test]
    fn test_phase_order_is_registration_order() {
        let (mut world, a, _) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        for name in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            scheduler
                .register_system(
                    &mut world,
                    name,
                    Signature::of(&[a.id()]),
                    SystemTemplate::new().with_update(move |_, _, _| order.borrow_mut().push(name)),
                )
                .unwrap();
        }

        let entity = world.create_entity().unwrap();
        world.set_component(entity, a, A).unwrap();
        let stats = scheduler.run_phase(&mut world, Phase::Update, 0.016);

        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
        assert_eq!(stats.systems_run, 3);
        assert_eq!(stats.entities_dispatched, 3);
        assert_eq!(stats.registrations, 3);
        // Render-only dispatch never touches update callbacks
        scheduler.run_phase(&mut world, Phase::Render, 0.0);
        assert_eq!(order.borrow().len(), 3);
    }

    #[test]
    fn test_component_added_mid_phase_visible_to_later_system() {
        let (mut world, a, b) = setup();
        let seen = Rc::new(RefCell::new(0usize));
        let seen_in_system = Rc::clone(&seen);

        let mut scheduler = Scheduler::new();
        scheduler
            .register_system(
                &mut world,
                "adder",
                Signature::of(&[a.id()]),
                SystemTemplate::new().with_fixed_update(move |world: &mut World, entities, _| {
                    for &e in entities {
                        world.set_component(e, b, B).unwrap();
                    }
                }),
            )
            .unwrap();
        scheduler
            .register_system(
                &mut world,
                "reader",
                Signature::of(&[b.id()]),
                SystemTemplate::new().with_fixed_update(move |_, entities, _| {
                    *seen_in_system.borrow_mut() += entities.len();
                }),
            )
            .unwrap();

        let entity = world.create_entity().unwrap();
        world.set_component(entity, a, A).unwrap();
        scheduler.run_phase(&mut world, Phase::FixedUpdate, 1.0 / 60.0);
        assert_eq!(*seen.borrow(), 1);
    }
}
