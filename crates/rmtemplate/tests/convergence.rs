//! End-to-end checks: a TOML rule table driven through parse, diff and the
//! controller by a module with per-interface command generation.

use pretty_assertions::assert_eq;
use rmtemplate::value::merged;
use rmtemplate::{
    Connection, Controller, Differ, Request, ResourceModule, RuleTable, RunOptions, State,
    TemplateEngine, TemplateFacts,
};
use serde_json::{Map, Value, json};

const INTERFACE_RULES: &str = r#"
[[rules]]
name = "name"
pattern = '^interface (?P<name>\S+)$'
shared = true
setval = "interface {{ name }}"

[rules.result."{{ name }}"]
name = "{{ name }}"

[[rules]]
name = "description"
pattern = '^\s+description (?P<description>.+)$'
setval = "description {{ description }}"

[rules.result."{{ name }}"]
description = "{{ description }}"

[[rules]]
name = "mtu"
pattern = '^\s+mtu (?P<mtu>\d+)$'
setval = "mtu {{ mtu }}"

[rules.result."{{ name }}"]
mtu = "{{ mtu }}"

[[rules]]
name = "shutdown"
pattern = '^\s+shutdown$'
setval = "shutdown"

[rules.result."{{ name }}"]
shutdown = true
"#;

const RUNNING_CONFIG: &str = "\
interface GigabitEthernet0/1
 description uplink
 mtu 9000
!
interface GigabitEthernet0/2
 shutdown
!
interface Loopback0
 description router-id
";

const CHILD_RULES: &[&str] = &["description", "mtu", "shutdown"];

struct Interfaces {
    engine: TemplateEngine,
}

impl Interfaces {
    fn new() -> Self {
        Self {
            engine: TemplateEngine::new(RuleTable::from_toml_str(INTERFACE_RULES).unwrap()),
        }
    }

    /// Compare one interface, opening its section only when something changed
    fn compare_interface(
        &self,
        differ: &mut Differ<'_>,
        name: &str,
        want: &Value,
        have: &Value,
    ) -> rmtemplate::Result<()> {
        let mut section = Differ::new(*differ.renderer());
        section.compare(CHILD_RULES, want, have)?;
        if !section.commands().is_empty() {
            differ.emit(&json!({ "name": name }), "name", false)?;
            differ.extend(section.into_commands());
        }
        Ok(())
    }
}

impl ResourceModule for Interfaces {
    fn resource(&self) -> &str {
        "interfaces"
    }

    fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    fn generate_commands(
        &self,
        differ: &mut Differ<'_>,
        state: State,
        want: &Value,
        have: &Value,
    ) -> rmtemplate::Result<()> {
        let empty = Map::new();
        let wanted = want.as_object().unwrap_or(&empty);
        let current = have.as_object().unwrap_or(&empty);

        for (name, want_entry) in wanted {
            let have_entry = current.get(name).cloned().unwrap_or(json!({}));
            let want_entry = match state {
                State::Merged => merged(&have_entry, want_entry),
                _ => want_entry.clone(),
            };
            self.compare_interface(differ, name, &want_entry, &have_entry)?;
        }

        if matches!(state, State::Overridden | State::Deleted) {
            for (name, have_entry) in current {
                if state == State::Overridden && wanted.contains_key(name) {
                    continue;
                }
                self.compare_interface(differ, name, &json!({ "name": name }), have_entry)?;
            }
        }
        Ok(())
    }
}

/// Device that records pushes and keeps its configuration unchanged
struct RecordingDevice {
    running: String,
    pushed: Vec<String>,
}

impl RecordingDevice {
    fn new() -> Self {
        Self {
            running: RUNNING_CONFIG.to_string(),
            pushed: Vec::new(),
        }
    }
}

impl Connection for RecordingDevice {
    fn get(&mut self, _command: &str) -> anyhow::Result<String> {
        Ok(self.running.clone())
    }

    fn edit_config(&mut self, commands: &[String]) -> anyhow::Result<()> {
        self.pushed.extend_from_slice(commands);
        Ok(())
    }
}

fn run(state: State, config: Option<Value>) -> (rmtemplate::RunResult, Vec<String>) {
    let module = Interfaces::new();
    let mut device = RecordingDevice::new();
    let mut facts = TemplateFacts::new(module.engine(), "show running-config interface");
    let mut request = Request::new(state);
    request.config = config;
    let result = Controller::new(RunOptions::default())
        .run(&module, request, &mut facts, Some(&mut device))
        .unwrap();
    (result, device.pushed)
}

#[test]
fn test_parses_interfaces_grouped_by_name() {
    let module = Interfaces::new();
    let facts = module.engine().parse_text(RUNNING_CONFIG).unwrap();
    assert_eq!(
        facts,
        json!({
            "GigabitEthernet0/1": {
                "name": "GigabitEthernet0/1",
                "description": "uplink",
                "mtu": 9000
            },
            "GigabitEthernet0/2": {"name": "GigabitEthernet0/2", "shutdown": true},
            "Loopback0": {"name": "Loopback0", "description": "router-id"}
        })
    );
}

#[test]
fn test_rendering_parsed_facts_reproduces_the_lines() {
    let module = Interfaces::new();
    let engine = module.engine();
    let facts = engine.parse_text(RUNNING_CONFIG).unwrap();

    let mut rendered = Vec::new();
    for entry in facts.as_object().unwrap().values() {
        for rule in ["name", "description", "mtu", "shutdown"] {
            if rule != "name" && entry.get(rule).is_none() {
                continue;
            }
            rendered.extend(engine.render(entry, rule, false).unwrap().into_lines());
        }
    }

    let original: Vec<&str> = RUNNING_CONFIG
        .lines()
        .map(str::trim)
        .filter(|line| *line != "!")
        .collect();
    assert_eq!(rendered, original);
}

#[test]
fn test_merged_only_adds() {
    let (result, pushed) = run(
        State::Merged,
        Some(json!({
            "GigabitEthernet0/1": {"name": "GigabitEthernet0/1", "mtu": 1500},
            "GigabitEthernet0/3": {"name": "GigabitEthernet0/3", "description": "new"}
        })),
    );
    let expected = vec![
        "interface GigabitEthernet0/1",
        "mtu 1500",
        "interface GigabitEthernet0/3",
        "description new",
    ];
    assert_eq!(result.commands.unwrap(), expected);
    assert_eq!(pushed, expected);
    assert_eq!(result.changed, Some(true));
}

#[test]
fn test_replaced_negates_unwanted_attributes() {
    let (result, _) = run(
        State::Replaced,
        Some(json!({
            "GigabitEthernet0/1": {"name": "GigabitEthernet0/1", "mtu": 9000},
            "GigabitEthernet0/2": {"name": "GigabitEthernet0/2", "shutdown": false}
        })),
    );
    assert_eq!(
        result.commands.unwrap(),
        vec![
            "interface GigabitEthernet0/1",
            "no description uplink",
            "interface GigabitEthernet0/2",
            "no shutdown",
        ]
    );
}

#[test]
fn test_overridden_also_cleans_unlisted_interfaces() {
    let (result, _) = run(
        State::Overridden,
        Some(json!({
            "GigabitEthernet0/1": {
                "name": "GigabitEthernet0/1",
                "description": "uplink",
                "mtu": 9000
            }
        })),
    );
    assert_eq!(
        result.commands.unwrap(),
        vec![
            "interface GigabitEthernet0/2",
            "no shutdown",
            "interface Loopback0",
            "no description router-id",
        ]
    );
}

#[test]
fn test_deleted_clears_every_interface() {
    let (result, pushed) = run(State::Deleted, None);
    assert_eq!(
        pushed,
        vec![
            "interface GigabitEthernet0/1",
            "no description uplink",
            "no mtu 9000",
            "interface GigabitEthernet0/2",
            "no shutdown",
            "interface Loopback0",
            "no description router-id",
        ]
    );
    assert!(result.after.is_some());
}

#[test]
fn test_converged_device_is_left_alone() {
    let module = Interfaces::new();
    let have = module.engine().parse_text(RUNNING_CONFIG).unwrap();
    let (result, pushed) = run(State::Overridden, Some(have.clone()));
    assert_eq!(result.commands, Some(Vec::new()));
    assert_eq!(result.changed, Some(false));
    assert_eq!(result.before, Some(have));
    assert!(pushed.is_empty());
}
