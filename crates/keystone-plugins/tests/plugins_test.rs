// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use keystone_plugins::{
    install, DisplayModule, DisplaySettings, HeadlessSwitch, JoystickModule, JoystickPort,
    KeyAction, KeyboardModule, LoggerModule, MouseModule, Platform, PlatformModule,
    PluginOptions,
};
use keystone_sdk::config::ProfilingConfig;
use keystone_sdk::prelude::*;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

struct Setup {
    framework: Framework,
    headless: HeadlessSwitch,
    port: JoystickPort,
}

fn setup(profiling: bool) -> Setup {
    setup_with(profiling, HeadlessSwitch::default())
}

fn setup_with(profiling: bool, headless: HeadlessSwitch) -> Setup {
    let port = JoystickPort::new();
    let mut framework = Framework::new(FrameworkConfig {
        profiling: ProfilingConfig {
            enabled: profiling,
            interval_ms: 0,
        },
        ..FrameworkConfig::default()
    });
    install(
        &mut framework,
        PluginOptions {
            headless: headless.clone(),
            display: DisplaySettings {
                width: 800,
                height: 600,
                title: "Plugins".to_owned(),
            },
            joystick_ports: vec![port.clone()],
        },
    )
    .unwrap();
    framework.start().unwrap();
    Setup {
        framework,
        headless,
        port,
    }
}

#[test]
fn test_modules_start_in_dependency_order() {
    let Setup { framework, .. } = setup(false);

    let names: Vec<_> = framework.order().iter().map(|id| id.name()).collect();

    assert_eq!(
        names,
        vec![
            "LoggerModule",
            "PlatformModule",
            "DisplayModule",
            "MouseModule",
            "KeyboardModule",
            "JoystickModule"
        ]
    );
}

#[test]
fn test_headless_swap_reaches_display_in_the_same_frame() {
    // ARRANGE
    let Setup {
        mut framework,
        headless,
        ..
    } = setup(false);
    let native = Platform::build_target();
    assert_eq!(
        framework.instance::<DisplayModule>().unwrap().platform(),
        Some(native)
    );

    // ACT
    headless.set(true);
    framework.tick_with_delta(FRAME).unwrap();

    // ASSERT
    assert_eq!(
        framework.instance::<PlatformModule>().unwrap().platform().unwrap(),
        Platform::Headless
    );
    assert_eq!(
        framework.instance::<PlatformModule>().unwrap().max_anisotropy().unwrap(),
        1.0
    );
    assert_eq!(
        framework.instance::<DisplayModule>().unwrap().platform(),
        Some(Platform::Headless)
    );

    headless.set(false);
    framework.tick_with_delta(FRAME).unwrap();
    let platform = framework.instance::<PlatformModule>().unwrap();
    assert_eq!(platform.backend_name(), Some("desktop"));
    assert_eq!(platform.swaps(), 3, "desktop, headless, desktop again");
}

#[test]
fn test_headless_requested_before_start_wins() {
    // ARRANGE
    let Setup {
        mut framework,
        headless,
        ..
    } = setup_with(false, HeadlessSwitch::new(true));

    // ACT
    framework.run_frames(3, FRAME).unwrap();

    // ASSERT
    let platform = framework.instance::<PlatformModule>().unwrap();
    assert_eq!(platform.backend_name(), Some("headless"));
    assert_eq!(platform.platform().unwrap(), Platform::Headless);
    assert_eq!(platform.swaps(), 1, "headless from the first resolve");
    assert_eq!(
        framework.instance::<DisplayModule>().unwrap().platform(),
        Some(Platform::Headless)
    );

    headless.set(false);
    framework.tick_with_delta(FRAME).unwrap();
    assert_eq!(
        framework.instance::<PlatformModule>().unwrap().backend_name(),
        Some("desktop"),
        "desktop takes over once headless is released"
    );
}

#[test]
fn test_mouse_is_clamped_to_the_display() {
    let Setup { mut framework, .. } = setup(false);
    assert_eq!(
        framework.instance::<MouseModule>().unwrap().position(),
        (400.0, 300.0)
    );

    framework
        .instance_mut::<MouseModule>()
        .unwrap()
        .move_by(1000.0, -50.0);
    framework.tick_with_delta(FRAME).unwrap();

    let mouse = framework.instance::<MouseModule>().unwrap();
    assert_eq!(mouse.position(), (800.0, 250.0));
    assert_eq!(mouse.delta(), (400.0, -50.0));
    assert_eq!(mouse.normalized_position(), (1.0, 250.0 / 600.0));

    framework
        .instance_mut::<DisplayModule>()
        .unwrap()
        .resize(640, 480);
    framework.tick_with_delta(FRAME).unwrap();
    let mouse = framework.instance::<MouseModule>().unwrap();
    assert_eq!(
        mouse.position(),
        (640.0, 250.0),
        "a shrinking display must pull the cursor inside"
    );
    assert_eq!(mouse.delta(), (-160.0, 0.0));
}

#[test]
fn test_joystick_hot_plug() {
    let Setup {
        mut framework,
        port,
        ..
    } = setup(false);
    framework.tick_with_delta(FRAME).unwrap();
    assert!(!framework.instance::<JoystickModule>().unwrap().is_connected());

    port.connect();
    port.set_button(2, true);
    framework.tick_with_delta(FRAME).unwrap();
    {
        let joystick = framework.instance::<JoystickModule>().unwrap();
        assert_eq!(joystick.connected_name(), Some("Joystick 0"));
        assert!(joystick.state().button(2));
    }

    port.disconnect();
    framework.tick_with_delta(FRAME).unwrap();
    let joystick = framework.instance::<JoystickModule>().unwrap();
    assert!(!joystick.is_connected());
    assert_eq!(joystick.state(), Default::default());
}

#[test]
fn test_keyboard_applies_queued_keys_on_the_next_frame() {
    // ARRANGE
    let Setup { mut framework, .. } = setup(false);
    let keyboard = framework.instance_mut::<KeyboardModule>().unwrap();
    keyboard.queue(65, KeyAction::Press);
    keyboard.queue(32, KeyAction::Press);
    keyboard.queue(32, KeyAction::Release);
    keyboard.queue(-4, KeyAction::Press);
    assert!(!keyboard.is_down(65), "nothing applies before the frame");

    // ACT
    framework.tick_with_delta(FRAME).unwrap();

    // ASSERT
    let keyboard = framework.instance::<KeyboardModule>().unwrap();
    assert!(keyboard.is_down(65));
    assert!(!keyboard.is_down(32), "the release came last");
    assert_eq!(keyboard.down_count(), 1);
    assert_eq!(keyboard.rejected(), 1);

    framework
        .instance_mut::<KeyboardModule>()
        .unwrap()
        .queue(65, KeyAction::Repeat);
    framework.tick_with_delta(FRAME).unwrap();
    assert_eq!(
        framework.instance::<KeyboardModule>().unwrap().action(65),
        Some(KeyAction::Repeat)
    );
}

#[test]
fn test_every_module_reports_a_profile_tab() {
    let Setup { mut framework, .. } = setup(true);

    framework.tick_with_delta(FRAME).unwrap();

    let profiler = framework.profiler();
    let tabs: Vec<_> = profiler.tabs().map(|(name, _)| name).collect();
    assert_eq!(
        tabs,
        vec!["Display", "Joysticks", "Keyboard", "Logger", "Mouse", "Platform"]
    );
    assert_eq!(
        profiler.tab("Logger").and_then(|tab| tab.get("Frames")),
        Some("1")
    );
    assert_eq!(
        profiler.tab("Display").and_then(|tab| tab.get("Size")),
        Some("800x600")
    );
}

#[test]
fn test_shutdown_disposes_everything() {
    let Setup { mut framework, .. } = setup(false);
    framework.run_frames(3, FRAME).unwrap();
    assert_eq!(framework.instance::<LoggerModule>().unwrap().frames(), 3);

    let report = framework.shutdown().unwrap();

    assert!(report.is_clean());
    assert_eq!(report.disposed().len(), 6);
    assert_eq!(report.disposed()[0].name(), "JoystickModule");
    assert_eq!(report.disposed()[5].name(), "LoggerModule");
}
