use std::{
    path::PathBuf,
    process::{Command, Output},
};

use super::WindowSystem;
use crate::db::models::GeometryRequest;
use crate::error::AutomationError;
use crate::log_debug;

const ENABLE_LOGS: bool = true;

/// Lists every window of every visible process as `app,title,x,y,w,h` lines.
/// Windows that refuse to report a position or size are left out. Untitled
/// windows get an empty title; commas and backslashes in application names
/// are escaped as `\,` and `\\`.
const ENUMERATE_SCRIPT: &str = r#"
on cleanText(v)
	if v is missing value then return ""
	try
		set t to v as text
	on error
		set t to ""
	end try
	set AppleScript's text item delimiters to {return, linefeed}
	set parts to text items of t
	set AppleScript's text item delimiters to " "
	set t to parts as text
	set AppleScript's text item delimiters to ""
	return t
end cleanText

on escapeName(v)
	set t to my cleanText(v)
	set AppleScript's text item delimiters to "\\"
	set parts to text items of t
	set AppleScript's text item delimiters to "\\\\"
	set t to parts as text
	set AppleScript's text item delimiters to ","
	set parts to text items of t
	set AppleScript's text item delimiters to "\\,"
	set t to parts as text
	set AppleScript's text item delimiters to ""
	return t
end escapeName

on run argv
	set windowData to ""
	tell application "System Events"
		repeat with appProcess in (application processes whose visible is true)
			set appName to my escapeName(name of appProcess)
			repeat with theWindow in (windows of appProcess)
				try
					set winTitle to ""
					try
						set winTitle to my cleanText(name of theWindow)
					end try
					set winPos to position of theWindow
					set winSize to size of theWindow
					set windowData to windowData & appName & "," & winTitle & "," & (item 1 of winPos as string) & "," & (item 2 of winPos as string) & "," & (item 1 of winSize as string) & "," & (item 2 of winSize as string) & linefeed
				end try
			end repeat
		end repeat
	end tell
	return windowData
end run
"#;

/// argv: app, title, x, y, width, height. Replies `ok`, `no-app` or `no-window`.
/// Takes the first window whose name matches; an untitled window matches `""`.
const GEOMETRY_SCRIPT: &str = r#"
on run argv
	set appName to item 1 of argv
	set winTitle to item 2 of argv
	set targetX to (item 3 of argv) as integer
	set targetY to (item 4 of argv) as integer
	set targetW to (item 5 of argv) as integer
	set targetH to (item 6 of argv) as integer
	tell application "System Events"
		set appList to application processes whose name is appName
		if (count of appList) is 0 then return "no-app"
		set appProcess to item 1 of appList
		set theWindow to missing value
		repeat with candidate in (windows of appProcess)
			set candidateName to name of candidate
			if candidateName is missing value then set candidateName to ""
			if candidateName is winTitle then
				set theWindow to contents of candidate
				exit repeat
			end if
		end repeat
		if theWindow is missing value then return "no-window"
		set position of theWindow to {targetX, targetY}
		set size of theWindow to {targetW, targetH}
	end tell
	return "ok"
end run
"#;

// AppleScript error numbers for missing Automation / Accessibility consent.
const DENIAL_MARKERS: [&str; 4] = ["-1743", "-25211", "-1719", "assistive access"];

/// macOS backend driving System Events through `osascript`.
///
/// Dynamic values travel as script arguments, never as script text.
#[derive(Debug, Clone)]
pub struct OsaScriptWindowSystem {
    program: PathBuf,
}

impl OsaScriptWindowSystem {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, script: &str, args: &[String]) -> Result<String, AutomationError> {
        let output = Command::new(&self.program)
            .arg("-e")
            .arg(script)
            .arg("--")
            .args(args)
            .output()
            .map_err(AutomationError::Spawn)?;

        if !output.status.success() {
            return Err(classify_failure(&output));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for OsaScriptWindowSystem {
    fn default() -> Self {
        Self::new("osascript")
    }
}

impl WindowSystem for OsaScriptWindowSystem {
    fn enumerate_windows(&self) -> Result<String, AutomationError> {
        self.run(ENUMERATE_SCRIPT, &[])
    }

    fn set_window_geometry(&self, request: &GeometryRequest<'_>) -> Result<(), AutomationError> {
        let args = [
            request.app_name.to_string(),
            request.window_title.to_string(),
            request.x.to_string(),
            request.y.to_string(),
            request.width.to_string(),
            request.height.to_string(),
        ];
        let reply = self.run(GEOMETRY_SCRIPT, &args)?;
        log_debug!(
            "Geometry reply for {} - {}: {}",
            request.app_name,
            request.window_title,
            reply.trim()
        );
        interpret_reply(reply.trim(), request)
    }
}

fn interpret_reply(reply: &str, request: &GeometryRequest<'_>) -> Result<(), AutomationError> {
    match reply {
        "ok" => Ok(()),
        "no-app" => Err(AutomationError::AppNotRunning {
            app: request.app_name.to_string(),
        }),
        "no-window" => Err(AutomationError::WindowNotFound {
            app: request.app_name.to_string(),
            title: request.window_title.to_string(),
        }),
        other => Err(AutomationError::ScriptFailed(format!(
            "unexpected reply {other:?}"
        ))),
    }
}

fn classify_failure(output: &Output) -> AutomationError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if DENIAL_MARKERS.iter().any(|marker| stderr.contains(marker)) {
        return AutomationError::Denied(stderr);
    }
    if stderr.is_empty() {
        let code = output.status.code().unwrap_or(-1);
        return AutomationError::ScriptFailed(format!("osascript exited with status {code}"));
    }
    AutomationError::ScriptFailed(stderr)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>() -> GeometryRequest<'a> {
        GeometryRequest {
            app_name: "Mail",
            window_title: "Inbox",
            x: 0,
            y: 0,
            width: 800,
            height: 600,
        }
    }

    #[test]
    fn replies_map_to_results() {
        assert!(interpret_reply("ok", &request()).is_ok());
        assert!(matches!(
            interpret_reply("no-app", &request()),
            Err(AutomationError::AppNotRunning { ref app }) if app == "Mail"
        ));
        assert!(matches!(
            interpret_reply("no-window", &request()),
            Err(AutomationError::WindowNotFound { ref title, .. }) if title == "Inbox"
        ));
        assert!(matches!(
            interpret_reply("", &request()),
            Err(AutomationError::ScriptFailed(_))
        ));
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let backend = OsaScriptWindowSystem::new("/nonexistent/wisa-osascript");
        assert!(matches!(
            backend.enumerate_windows(),
            Err(AutomationError::Spawn(_))
        ));
    }

    #[test]
    fn enumeration_script_blanks_missing_titles_and_escapes_app_names() {
        let clean_text = ENUMERATE_SCRIPT
            .split("on cleanText(v)")
            .nth(1)
            .and_then(|rest| rest.split("end cleanText").next())
            .unwrap();
        assert_eq!(
            clean_text.trim().lines().next(),
            Some("if v is missing value then return \"\"")
        );
        assert!(ENUMERATE_SCRIPT.contains("set appName to my escapeName(name of appProcess)"));
        assert!(ENUMERATE_SCRIPT.contains("set winTitle to my cleanText(name of theWindow)"));
        assert!(GEOMETRY_SCRIPT
            .contains("if candidateName is missing value then set candidateName to \"\""));
    }

    #[cfg(unix)]
    mod fake_program {
        use std::{
            fs::{self, File},
            io::Write,
            os::unix::fs::PermissionsExt,
            path::Path,
            thread,
            time::Duration,
        };

        use super::*;
        use crate::db::models::WindowState;
        use crate::window_system::decode_records;

        // errno for "Text file busy" on Linux and macOS.
        const ETXTBSY: i32 = 26;

        fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
            let path = dir.join(name);
            let mut file = File::create(&path).unwrap();
            file.write_all(format!("#!/bin/sh\n{body}\n").as_bytes())
                .unwrap();
            file.sync_all().unwrap();
            drop(file);
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        /// A test thread forking while another still holds a script open for
        /// writing makes exec fail with ETXTBSY until that child execs.
        fn run_fake<T>(
            mut call: impl FnMut() -> Result<T, AutomationError>,
        ) -> Result<T, AutomationError> {
            let mut attempts = 0;
            loop {
                match call() {
                    Err(AutomationError::Spawn(err))
                        if err.raw_os_error() == Some(ETXTBSY) && attempts < 50 =>
                    {
                        attempts += 1;
                        thread::sleep(Duration::from_millis(10));
                    }
                    other => return other,
                }
            }
        }

        #[test]
        fn stdout_and_exit_status_are_interpreted() {
            let dir = tempfile::tempdir().unwrap();
            let listing = write_script(dir.path(), "list", "printf 'Mail,Inbox,0,0,800,600\\n'");
            let missing = write_script(dir.path(), "missing", "echo no-window");
            let denied = write_script(
                dir.path(),
                "denied",
                "echo 'Not authorized to send Apple events to System Events. (-1743)' >&2; exit 1",
            );
            let broken = write_script(dir.path(), "broken", "exit 3");

            let output = run_fake(|| OsaScriptWindowSystem::new(&listing).enumerate_windows())
                .unwrap();
            assert_eq!(output, "Mail,Inbox,0,0,800,600\n");

            assert!(matches!(
                run_fake(|| OsaScriptWindowSystem::new(&missing).set_window_geometry(&request())),
                Err(AutomationError::WindowNotFound { .. })
            ));
            assert!(matches!(
                run_fake(|| OsaScriptWindowSystem::new(&denied).enumerate_windows()),
                Err(AutomationError::Denied(_))
            ));
            match run_fake(|| OsaScriptWindowSystem::new(&broken).enumerate_windows()) {
                Err(AutomationError::ScriptFailed(message)) => {
                    assert!(message.contains("status 3"), "{message}");
                }
                other => panic!("expected script failure, got {other:?}"),
            }
        }

        #[test]
        fn untitled_windows_and_comma_app_names_decode_cleanly() {
            let dir = tempfile::tempdir().unwrap();
            // What the enumeration script prints for an untitled Finder window
            // and an application named "Foo, Inc.".
            let listing = write_script(
                dir.path(),
                "list",
                r"printf '%s\n' 'Finder,,10,20,300,200' 'Foo\, Inc.,Main, draft,0,0,10,10'",
            );

            let output = run_fake(|| OsaScriptWindowSystem::new(&listing).enumerate_windows())
                .unwrap();
            let (states, skipped) = decode_records(&output);

            assert_eq!(skipped, 0);
            assert_eq!(
                states,
                vec![
                    WindowState::new("Finder", "", 10.0, 20.0, 300.0, 200.0),
                    WindowState::new("Foo, Inc.", "Main, draft", 0.0, 0.0, 10.0, 10.0),
                ]
            );
        }
    }
}
