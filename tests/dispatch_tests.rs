//! Integration tests for hook dispatch: priority ordering, first-responder
//! and broadcast semantics, meta-hook wrapping, and ownership transfer.

use std::sync::{Arc, Mutex};

use seine_plugins::{
    Configuration, Event, EventDisposition, Frame, Func, FuncResult, HookArgument,
    HookArgumentList, HookType, LoadFileOutcome, LoadFileResolution, ManagerConfig, ObjToken,
    Plugin, PluginContext, PluginManager, Val, ValList,
};

// =============================================================================
// Probe plugin
// =============================================================================

/// Shared invocation log, ordered across plugins.
#[derive(Clone, Default)]
struct TraceLog(Arc<Mutex<Vec<String>>>);

impl TraceLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn count_prefixed(&self, prefix: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.starts_with(prefix))
            .count()
    }

    fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }
}

/// A probe that records every hook invocation it sees.
struct ProbePlugin {
    name: &'static str,
    hooks: Vec<(HookType, i32)>,
    log: TraceLog,
    call_result: Option<Val>,
    claim_events: bool,
    tag_events: bool,
    load_outcome: LoadFileOutcome,
    dtor_interest: Option<ObjToken>,
}

impl ProbePlugin {
    fn new(name: &'static str, log: &TraceLog) -> Self {
        Self {
            name,
            hooks: Vec::new(),
            log: log.clone(),
            call_result: None,
            claim_events: false,
            tag_events: false,
            load_outcome: LoadFileOutcome::NotInterested,
            dtor_interest: None,
        }
    }

    fn with_hook(mut self, hook: HookType, priority: i32) -> Self {
        self.hooks.push((hook, priority));
        self
    }

    fn handling_calls(mut self, value: Val) -> Self {
        self.call_result = Some(value);
        self
    }

    fn claiming_events(mut self) -> Self {
        self.claim_events = true;
        self
    }

    fn tagging_events(mut self) -> Self {
        self.tag_events = true;
        self
    }

    fn loading_files(mut self, outcome: LoadFileOutcome) -> Self {
        self.load_outcome = outcome;
        self
    }

    fn watching_dtor(mut self, token: ObjToken) -> Self {
        self.dtor_interest = Some(token);
        self
    }
}

impl Plugin for ProbePlugin {
    fn configure(&mut self) -> Configuration {
        Configuration::new(self.name, "dispatch probe")
    }

    fn init_pre_script(&mut self, ctx: &mut PluginContext<'_>) {
        for (hook, priority) in &self.hooks {
            ctx.enable_hook(*hook, *priority);
        }
        if let Some(token) = self.dtor_interest {
            ctx.request_obj_dtor(token);
        }
    }

    fn hook_load_file(&mut self, file: &str, _ext: &str) -> LoadFileOutcome {
        self.log.push(format!("{}:load:{}", self.name, file));
        self.load_outcome
    }

    fn hook_call_function(
        &mut self,
        func: &Func,
        _frame: &Frame,
        _args: &mut ValList,
    ) -> FuncResult {
        self.log.push(format!("{}:call:{}", self.name, func.name()));
        match &self.call_result {
            Some(value) => FuncResult::handled(value.clone()),
            None => FuncResult::unhandled(),
        }
    }

    fn hook_queue_event(&mut self, mut event: Event) -> EventDisposition {
        self.log.push(format!("{}:event:{}", self.name, event.name()));
        if self.tag_events {
            event.args_mut().push(Val::new(self.name));
        }
        if self.claim_events {
            EventDisposition::Claimed
        } else {
            EventDisposition::Declined(event)
        }
    }

    fn hook_drain_events(&mut self) {
        self.log.push(format!("{}:drain", self.name));
    }

    fn hook_update_network_time(&mut self, network_time: f64) {
        self.log.push(format!("{}:time:{}", self.name, network_time));
    }

    fn hook_obj_dtor(&mut self, obj: ObjToken) {
        self.log.push(format!("{}:dtor:{}", self.name, obj));
    }

    fn meta_hook_pre(&mut self, hook: HookType, args: &HookArgumentList<'_>) {
        self.log
            .push(format!("{}:meta-pre:{}:{}", self.name, hook, args.len()));
    }

    fn meta_hook_post(
        &mut self,
        hook: HookType,
        _args: &HookArgumentList<'_>,
        result: &HookArgument<'_>,
    ) {
        self.log
            .push(format!("{}:meta-post:{}:{}", self.name, hook, result));
    }
}

/// Register the given plugins and run the full startup sequence.
fn started(plugins: Vec<ProbePlugin>) -> PluginManager {
    let mut manager = PluginManager::new(ManagerConfig::default());
    for plugin in plugins {
        manager.register(Box::new(plugin)).unwrap();
    }
    manager.init_pre_script_all();
    manager.init_post_script_all();
    manager
}

/// Register the given plugins and stop after pre-script init, inside the
/// input-file loading window.
fn loading(plugins: Vec<ProbePlugin>) -> PluginManager {
    let mut manager = PluginManager::new(ManagerConfig::default());
    for plugin in plugins {
        manager.register(Box::new(plugin)).unwrap();
    }
    manager.init_pre_script_all();
    manager
}

// =============================================================================
// Meta-hook wrapping
// =============================================================================

#[test]
fn test_meta_hooks_fire_without_target_plugins() {
    let log = TraceLog::default();
    let observer = ProbePlugin::new("Seine::Observer", &log)
        .with_hook(HookType::MetaPre, 0)
        .with_hook(HookType::MetaPost, 0);
    let mut manager = started(vec![observer]);

    let func = Func::new("Example::f");
    let frame = Frame::new(1);
    let mut args = vec![Val::new(1)];
    let result = manager.dispatch_call_function(&func, &frame, &mut args);

    assert!(!result.is_handled());
    assert_eq!(
        log.entries(),
        vec![
            "Seine::Observer:meta-pre:call_function:3",
            "Seine::Observer:meta-post:call_function:<no result>",
        ]
    );
}

#[test]
fn test_meta_hooks_fire_once_per_occurrence() {
    let log = TraceLog::default();
    let observer = ProbePlugin::new("Seine::Observer", &log)
        .with_hook(HookType::MetaPre, 0)
        .with_hook(HookType::MetaPost, 0);
    let a = ProbePlugin::new("Seine::A", &log).with_hook(HookType::DrainEvents, 0);
    let b = ProbePlugin::new("Seine::B", &log).with_hook(HookType::DrainEvents, 0);
    let mut manager = started(vec![observer, a, b]);

    manager.dispatch_drain_events();
    manager.dispatch_drain_events();

    assert_eq!(log.count_prefixed("Seine::Observer:meta-pre:drain_events"), 2);
    assert_eq!(log.count_prefixed("Seine::Observer:meta-post:drain_events"), 2);
}

// =============================================================================
// Function call dispatch
// =============================================================================

#[test]
fn test_priority_order_and_final_result() {
    let log = TraceLog::default();
    let a = ProbePlugin::new("Seine::A", &log).with_hook(HookType::CallFunction, 5);
    let b = ProbePlugin::new("Seine::B", &log)
        .with_hook(HookType::CallFunction, 1)
        .handling_calls(Val::new(42));
    let observer = ProbePlugin::new("Seine::M", &log).with_hook(HookType::MetaPost, 0);
    let mut manager = started(vec![a, b, observer]);

    let func = Func::new("Example::f");
    let frame = Frame::new(0);
    let mut args = ValList::new();
    let result = manager.dispatch_call_function(&func, &frame, &mut args);

    assert_eq!(result.into_value(), Some(Val::new(42)));
    assert_eq!(
        log.entries(),
        vec![
            "Seine::A:call:Example::f",
            "Seine::B:call:Example::f",
            "Seine::M:meta-post:call_function:42",
        ]
    );
}

#[test]
fn test_first_claiming_plugin_wins() {
    let log = TraceLog::default();
    let first = ProbePlugin::new("Seine::First", &log)
        .with_hook(HookType::CallFunction, 10)
        .handling_calls(Val::new("first"));
    let second = ProbePlugin::new("Seine::Second", &log)
        .with_hook(HookType::CallFunction, 5)
        .handling_calls(Val::new("second"));
    let mut manager = started(vec![first, second]);

    let func = Func::new("Example::f");
    let frame = Frame::new(0);
    let mut args = ValList::new();
    let result = manager.dispatch_call_function(&func, &frame, &mut args);

    assert_eq!(result.into_value(), Some(Val::new("first")));
    assert_eq!(log.count_prefixed("Seine::Second:"), 0);
}

#[test]
fn test_stats_track_invocations() {
    let log = TraceLog::default();
    let plugin = ProbePlugin::new("Seine::Watcher", &log).with_hook(HookType::CallFunction, 0);
    let mut manager = started(vec![plugin]);

    let func = Func::new("Example::f");
    let frame = Frame::new(0);
    let mut args = ValList::new();
    manager.dispatch_call_function(&func, &frame, &mut args);
    manager.dispatch_call_function(&func, &frame, &mut args);

    let stats = manager.stats("Seine::Watcher").unwrap();
    assert_eq!(stats.hooks_invoked, 2);
    assert_eq!(stats.calls_intercepted, 0);
    assert!(stats.last_activity.is_some());
}

// =============================================================================
// Input file dispatch
// =============================================================================

#[test]
fn test_load_file_attribution() {
    let log = TraceLog::default();
    let a = ProbePlugin::new("Seine::A", &log).with_hook(HookType::LoadFile, 10);
    let b = ProbePlugin::new("Seine::B", &log)
        .with_hook(HookType::LoadFile, 5)
        .loading_files(LoadFileOutcome::Loaded);
    let mut manager = loading(vec![a, b]);

    let resolution = manager.dispatch_load_file("foo.sn", "sn");

    assert_eq!(resolution, LoadFileResolution::LoadedBy("Seine::B".into()));
    assert_eq!(
        log.entries(),
        vec!["Seine::A:load:foo.sn", "Seine::B:load:foo.sn"]
    );
    assert_eq!(manager.stats("Seine::B").unwrap().files_claimed, 1);
}

#[test]
fn test_load_file_failure_is_claiming() {
    let log = TraceLog::default();
    let broken = ProbePlugin::new("Seine::Broken", &log)
        .with_hook(HookType::LoadFile, 10)
        .loading_files(LoadFileOutcome::Failed);
    let fallback = ProbePlugin::new("Seine::Fallback", &log)
        .with_hook(HookType::LoadFile, 5)
        .loading_files(LoadFileOutcome::Loaded);
    let mut manager = loading(vec![broken, fallback]);

    let resolution = manager.dispatch_load_file("foo.sn", "sn");

    assert_eq!(resolution, LoadFileResolution::FailedBy("Seine::Broken".into()));
    assert_eq!(log.count_prefixed("Seine::Fallback:"), 0);
}

#[test]
fn test_load_file_unclaimed_observed_by_meta() {
    let log = TraceLog::default();
    let observer = ProbePlugin::new("Seine::Observer", &log)
        .with_hook(HookType::MetaPre, 0)
        .with_hook(HookType::MetaPost, 0);
    let mut manager = loading(vec![observer]);

    let resolution = manager.dispatch_load_file("foo.sn", "sn");

    assert_eq!(resolution, LoadFileResolution::Unclaimed);
    assert!(log.contains("Seine::Observer:meta-pre:load_file:2"));
    assert!(log.contains("Seine::Observer:meta-post:load_file:-1"));
}

// =============================================================================
// Event queue dispatch
// =============================================================================

#[test]
fn test_queue_event_claimed_in_middle() {
    let log = TraceLog::default();
    let a = ProbePlugin::new("Seine::A", &log).with_hook(HookType::QueueEvent, 10);
    let b = ProbePlugin::new("Seine::B", &log)
        .with_hook(HookType::QueueEvent, 5)
        .claiming_events();
    let c = ProbePlugin::new("Seine::C", &log).with_hook(HookType::QueueEvent, 1);
    let mut manager = started(vec![a, b, c]);

    let surviving = manager.dispatch_queue_event(Event::new("seine_ping", vec![]));

    assert!(surviving.is_none());
    assert_eq!(
        log.entries(),
        vec!["Seine::A:event:seine_ping", "Seine::B:event:seine_ping"]
    );
    assert_eq!(manager.stats("Seine::B").unwrap().events_claimed, 1);
}

#[test]
fn test_queue_event_declined_returns_modified_event() {
    let log = TraceLog::default();
    let tagger = ProbePlugin::new("Seine::Tagger", &log)
        .with_hook(HookType::QueueEvent, 0)
        .tagging_events();
    let mut manager = started(vec![tagger]);

    let surviving = manager
        .dispatch_queue_event(Event::new("seine_ping", vec![Val::new(1)]))
        .expect("unclaimed event must come back");

    assert_eq!(surviving.args().len(), 2);
    assert_eq!(surviving.args()[1], Val::new("Seine::Tagger"));
}

#[test]
fn test_queue_event_claim_observed_by_meta() {
    let log = TraceLog::default();
    let observer = ProbePlugin::new("Seine::Observer", &log).with_hook(HookType::MetaPost, 0);
    let claimer = ProbePlugin::new("Seine::Claimer", &log)
        .with_hook(HookType::QueueEvent, 0)
        .claiming_events();
    let mut manager = started(vec![observer, claimer]);

    let surviving = manager.dispatch_queue_event(Event::new("seine_ping", vec![]));

    assert!(surviving.is_none());
    assert!(log.contains("Seine::Observer:meta-post:queue_event:true"));
}

// =============================================================================
// Broadcast hooks
// =============================================================================

#[test]
fn test_broadcast_reaches_every_plugin() {
    let log = TraceLog::default();
    let a = ProbePlugin::new("Seine::A", &log)
        .with_hook(HookType::DrainEvents, 10)
        .with_hook(HookType::UpdateNetworkTime, 10);
    let b = ProbePlugin::new("Seine::B", &log)
        .with_hook(HookType::DrainEvents, 5)
        .with_hook(HookType::UpdateNetworkTime, 5);
    let mut manager = started(vec![a, b]);

    manager.dispatch_drain_events();
    manager.dispatch_update_network_time(1234.5);

    assert_eq!(
        log.entries(),
        vec![
            "Seine::A:drain",
            "Seine::B:drain",
            "Seine::A:time:1234.5",
            "Seine::B:time:1234.5",
        ]
    );
}

#[test]
fn test_obj_destroy_interest_and_notification() {
    let log = TraceLog::default();
    let token = ObjToken::new(0x7);
    let watcher = ProbePlugin::new("Seine::Watcher", &log)
        .with_hook(HookType::ObjDestroy, 0)
        .watching_dtor(token);
    let mut manager = started(vec![watcher]);

    assert!(manager.wants_obj_destroy(token));
    assert!(!manager.wants_obj_destroy(ObjToken::new(0x8)));

    manager.dispatch_obj_destroy(token);

    assert!(log.contains("Seine::Watcher:dtor:0x7"));
    assert!(!manager.wants_obj_destroy(token));
}
