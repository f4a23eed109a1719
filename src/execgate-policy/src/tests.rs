//! Tests for the Execgate policy engine.
//!
//! Coverage:
//! 1. Decision types and exit codes
//! 2. Network intent classification
//! 3. System-level tool deny-list
//! 4. Destructive writes outside the writable roots
//! 5. Rule precedence and determinism
//! 6. Sandbox modes

use std::path::PathBuf;

use super::*;

fn profile(network: NetworkPolicy, roots: &[&str]) -> Profile {
    Profile::with_temp_roots(
        network,
        roots.iter().map(PathBuf::from),
        [PathBuf::from("/tmp")],
    )
}

fn run(profile: &Profile, argv: &[&str]) -> Decision {
    evaluate(profile, "/work", argv).unwrap()
}

fn deny_reason(decision: &Decision) -> &str {
    match decision {
        Decision::Deny(denial) => &denial.reason,
        Decision::Allow => panic!("expected a denial, got {decision}"),
    }
}

// ============================================================================
// Decision Tests
// ============================================================================

mod decision_tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_stable() {
        assert_eq!(DenialKind::Network.exit_code(), 113);
        assert_eq!(DenialKind::Containment.exit_code(), 114);
        assert_eq!(Denial::network("x").exit_code(), EXIT_NETWORK_DENIED);
        assert_eq!(Denial::containment("x").exit_code(), EXIT_CONTAINMENT_DENIED);
    }

    #[test]
    fn test_decision_methods() {
        let deny = Decision::Deny(Denial::network("network disabled: blocking 'curl'"));
        assert!(Decision::Allow.is_allowed());
        assert!(!Decision::Allow.is_blocked());
        assert!(deny.is_blocked());
        assert_eq!(Decision::Allow.denial(), None);
        assert_eq!(deny.denial().map(|d| d.kind), Some(DenialKind::Network));
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Allow.to_string(), "ALLOW");
        assert_eq!(
            Decision::Deny(Denial::containment("rm outside project: /etc/passwd")).to_string(),
            "DENY (rm outside project: /etc/passwd)"
        );
    }

    #[test]
    fn test_decision_serializes_with_outcome_tag() {
        assert_eq!(
            serde_json::to_value(Decision::Allow).unwrap(),
            serde_json::json!({ "outcome": "allow" })
        );
        assert_eq!(
            serde_json::to_value(Decision::Deny(Denial::network("network disabled: blocking 'wget'")))
                .unwrap(),
            serde_json::json!({
                "outcome": "deny",
                "kind": "network",
                "reason": "network disabled: blocking 'wget'"
            })
        );
    }

    #[test]
    fn test_empty_argv_is_an_error_not_a_denial() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        let empty: [&str; 0] = [];
        assert_eq!(evaluate(&p, "/work", &empty), Err(GateError::EmptyCommand));
    }
}

// ============================================================================
// Network Intent Tests
// ============================================================================

mod network_tests {
    use super::*;

    #[test]
    fn test_curl_denied_when_network_off() {
        let decision = run(&profile(NetworkPolicy::Off, &["/work"]), &["curl", "http://example.com"]);
        assert_eq!(
            decision,
            Decision::Deny(Denial::network("network disabled: blocking 'curl'"))
        );
    }

    #[test]
    fn test_downloaders_allowed_when_network_on() {
        let p = profile(NetworkPolicy::On, &["/work"]);
        assert_eq!(run(&p, &["curl", "http://example.com"]), Decision::Allow);
        assert_eq!(run(&p, &["wget", "http://example.com"]), Decision::Allow);
    }

    #[test]
    fn test_downloader_by_full_path() {
        let decision = run(&profile(NetworkPolicy::Off, &["/work"]), &["/usr/bin/wget", "x"]);
        assert_eq!(deny_reason(&decision), "network disabled: blocking 'wget'");
    }

    #[test]
    fn test_local_git_is_not_network() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        for argv in [
            vec!["git", "status"],
            vec!["git", "commit", "-m", "fetch the thing"],
            vec!["git", "log", "--oneline"],
            vec!["git"],
        ] {
            assert_eq!(run(&p, &argv), Decision::Allow, "{argv:?}");
        }
    }

    #[test]
    fn test_remote_git_is_network() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        for argv in [
            vec!["git", "clone", "https://example.com/repo.git"],
            vec!["git", "fetch", "origin"],
            vec!["git", "pull"],
            vec!["git", "submodule", "update", "--init"],
            vec!["git", "remote", "update"],
            vec!["git", "--no-pager", "fetch"],
            vec!["git", "-C", "sub", "pull"],
        ] {
            assert_eq!(
                run(&p, &argv).denial().map(|d| d.kind),
                Some(DenialKind::Network),
                "{argv:?}"
            );
        }
    }

    #[test]
    fn test_node_package_managers() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        assert!(run(&p, &["npm", "install"]).is_blocked());
        assert!(run(&p, &["pnpm", "add", "left-pad"]).is_blocked());
        assert!(run(&p, &["yarn", "upgrade"]).is_blocked());
        assert!(run(&p, &["npm", "--silent", "update"]).is_blocked());
        assert_eq!(run(&p, &["npm", "run", "build"]), Decision::Allow);
        assert_eq!(run(&p, &["yarn", "test"]), Decision::Allow);
    }

    #[test]
    fn test_python_package_managers() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        assert!(run(&p, &["pip", "install", "requests"]).is_blocked());
        assert!(run(&p, &["pip3", "download", "x"]).is_blocked());
        assert!(run(&p, &["pip", "wheel", "."]).is_blocked());
        assert!(run(&p, &["uv", "pip", "install", "x"]).is_blocked());
        assert_eq!(run(&p, &["pip", "list"]), Decision::Allow);
        assert_eq!(run(&p, &["pip", "freeze"]), Decision::Allow);
        assert_eq!(run(&p, &["uv", "run", "pytest"]), Decision::Allow);
    }

    #[test]
    fn test_unknown_programs_are_not_network() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        assert_eq!(run(&p, &["ssh", "example.com"]), Decision::Allow);
        assert_eq!(run(&p, &["python3", "-m", "http.server"]), Decision::Allow);
        assert_eq!(run(&p, &["cargo", "build"]), Decision::Allow);
    }
}

// ============================================================================
// System-Level Tool Tests
// ============================================================================

mod system_tool_tests {
    use super::*;

    #[test]
    fn test_sudo_blocked_even_with_network_on() {
        let decision = run(
            &profile(NetworkPolicy::On, &["/work"]),
            &["sudo", "apt-get", "install", "x"],
        );
        assert_eq!(
            decision,
            Decision::Deny(Denial::containment("system-level tool blocked: sudo"))
        );
        assert_eq!(decision.denial().map(Denial::exit_code), Some(114));
    }

    #[test]
    fn test_whole_deny_list_blocked() {
        let p = profile(NetworkPolicy::On, &["/"]);
        for tool in SYSTEM_TOOLS {
            assert_eq!(
                deny_reason(&run(&p, &[*tool])),
                format!("system-level tool blocked: {tool}")
            );
        }
    }

    #[test]
    fn test_mkfs_variants_blocked() {
        let p = profile(NetworkPolicy::On, &["/work"]);
        assert_eq!(
            deny_reason(&run(&p, &["/sbin/mkfs.ext4", "/work/disk.img"])),
            "system-level tool blocked: mkfs.ext4"
        );
    }

    #[test]
    fn test_container_tools_blocked() {
        let p = profile(NetworkPolicy::On, &["/work"]);
        assert!(run(&p, &["docker", "ps"]).is_blocked());
        assert!(run(&p, &["podman", "run", "alpine"]).is_blocked());
    }
}

// ============================================================================
// Destructive Write Tests
// ============================================================================

mod destructive_tests {
    use super::*;

    fn work() -> Profile {
        profile(NetworkPolicy::Off, &["/work"])
    }

    #[test]
    fn test_rm_outside_project_denied() {
        let decision = run(&work(), &["rm", "/etc/passwd"]);
        assert_eq!(
            decision,
            Decision::Deny(Denial::containment("rm outside project: /etc/passwd"))
        );
    }

    #[test]
    fn test_rm_of_root_denied_even_when_root_is_writable() {
        let p = profile(NetworkPolicy::Off, &["/"]);
        assert_eq!(deny_reason(&run(&p, &["rm", "-rf", "/"])), "rm of filesystem root: /");
        assert_eq!(deny_reason(&run(&p, &["rm", "-rf", "/*"])), "rm of filesystem root: /*");
    }

    #[test]
    fn test_rm_inside_project_allowed() {
        let p = work();
        assert_eq!(run(&p, &["rm", "-rf", "/work/build"]), Decision::Allow);
        assert_eq!(run(&p, &["rm", "/tmp/scratch"]), Decision::Allow);
        assert_eq!(run(&p, &["rm", "-f", "relative/file"]), Decision::Allow);
    }

    #[test]
    fn test_rm_reports_first_outside_argument() {
        let decision = run(&work(), &["rm", "/work/a", "/opt/b", "/etc/c"]);
        assert_eq!(deny_reason(&decision), "rm outside project: /opt/b");
    }

    #[test]
    fn test_parent_traversal_does_not_escape() {
        let decision = run(&work(), &["rm", "/work/../etc/passwd"]);
        assert_eq!(deny_reason(&decision), "rm outside project: /work/../etc/passwd");
    }

    #[test]
    fn test_destination_writers_check_last_argument() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["mv", "/work/a", "/etc/a"])),
            "mv outside project: /etc/a"
        );
        assert_eq!(
            deny_reason(&run(&p, &["mkdir", "-p", "/opt/new"])),
            "mkdir outside project: /opt/new"
        );
        assert_eq!(
            deny_reason(&run(&p, &["rsync", "-a", "src/", "/srv/dst"])),
            "rsync outside project: /srv/dst"
        );
        // Reading from outside is fine; only the destination matters.
        assert_eq!(run(&p, &["cp", "/etc/hosts", "/work/hosts"]), Decision::Allow);
        assert_eq!(run(&p, &["touch", "/work/a.txt"]), Decision::Allow);
        assert_eq!(run(&p, &["install", "-m", "755", "bin", "/tmp/bin"]), Decision::Allow);
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_outside() {
        let decision = run(&work(), &["touch", "/tmp-evil"]);
        assert_eq!(deny_reason(&decision), "touch outside project: /tmp-evil");
    }

    #[test]
    fn test_link_and_permissions() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["ln", "-s", "/work/a", "/usr/local/bin/a"])),
            "ln outside project: /usr/local/bin/a"
        );
        assert_eq!(
            deny_reason(&run(&p, &["chmod", "777", "/etc/shadow"])),
            "chmod outside project: /etc/shadow"
        );
        assert_eq!(
            deny_reason(&run(&p, &["chown", "nobody", "/var/lib/x"])),
            "chown outside project: /var/lib/x"
        );
        assert_eq!(run(&p, &["chmod", "+x", "/work/run.sh"]), Decision::Allow);
    }

    #[test]
    fn test_sed_only_denied_in_place() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["sed", "-i", "s/a/b/", "/etc/hosts"])),
            "sed -i outside project: /etc/hosts"
        );
        assert!(run(&p, &["sed", "-i.bak", "s/a/b/", "/etc/hosts"]).is_blocked());
        assert_eq!(run(&p, &["sed", "s/a/b/", "/etc/hosts"]), Decision::Allow);
        assert_eq!(run(&p, &["sed", "-i", "s/a/b/", "/work/f"]), Decision::Allow);
    }

    #[test]
    fn test_dd_targets() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["dd", "if=/dev/zero", "of=/dev/sda", "bs=1M"])),
            "dd to device: /dev/sda"
        );
        assert_eq!(
            deny_reason(&run(&p, &["dd", "if=/work/a", "of=/etc/b"])),
            "dd outside project: /etc/b"
        );
        assert_eq!(
            run(&p, &["dd", "if=/dev/urandom", "of=/work/rand.bin", "count=1"]),
            Decision::Allow
        );
    }

    #[test]
    fn test_dd_device_write_denied_regardless_of_roots() {
        let p = profile(NetworkPolicy::Off, &["/"]);
        assert!(run(&p, &["dd", "of=/dev/nvme0n1"]).is_blocked());
    }

    #[test]
    fn test_redirection_scan_any_program() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["echo", "hi", ">", "/etc/motd"])),
            "redirect outside project: /etc/motd"
        );
        assert_eq!(
            deny_reason(&run(&p, &["cat", "x", ">>", "/etc/profile"])),
            "redirect outside project: /etc/profile"
        );
        assert_eq!(
            deny_reason(&run(&p, &["make", "2>", "/var/log/build.log"])),
            "redirect outside project: /var/log/build.log"
        );
        assert_eq!(
            deny_reason(&run(&p, &["make", "2>>/var/log/build.log"])),
            "redirect outside project: /var/log/build.log"
        );
        assert_eq!(run(&p, &["echo", "hi", ">", "/work/out.txt"]), Decision::Allow);
        assert_eq!(run(&p, &["echo", "hi", ">", "relative.txt"]), Decision::Allow);
        assert_eq!(run(&p, &["echo", "hi", ">"]), Decision::Allow);
        assert_eq!(run(&p, &["cmd", "2>&1"]), Decision::Allow);
    }

    #[test]
    fn test_redirection_in_decomposed_shell_argv() {
        let decision = run(&work(), &["sh", "-c", "echo hi", ">", "/etc/motd"]);
        assert_eq!(deny_reason(&decision), "redirect outside project: /etc/motd");
    }

    #[test]
    fn test_redirection_inside_shell_script_string() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["sh", "-c", "echo hi > /etc/motd"])),
            "redirect outside project: /etc/motd"
        );
        assert_eq!(
            deny_reason(&run(&p, &["bash", "-ec", "echo 'a b' >> '/etc/x y'"])),
            "redirect outside project: /etc/x y"
        );
        assert_eq!(run(&p, &["sh", "-c", "echo hi > /work/out"]), Decision::Allow);
        // Unbalanced quotes fall back to whitespace splitting.
        assert!(run(&p, &["sh", "-c", "echo 'oops > /etc/motd"]).is_blocked());
    }

    #[test]
    fn test_attached_redirection_inside_shell_script_word() {
        let p = work();
        assert_eq!(
            deny_reason(&run(&p, &["sh", "-c", "echo hi>/etc/motd"])),
            "redirect outside project: /etc/motd"
        );
        assert_eq!(
            deny_reason(&run(&p, &["bash", "-c", "make all2>>/var/log/build.log"])),
            "redirect outside project: /var/log/build.log"
        );
        assert_eq!(run(&p, &["sh", "-c", "echo hi>/work/out"]), Decision::Allow);
    }

    #[test]
    fn test_reason_with_newline_stays_on_one_line() {
        let decision = run(&work(), &["rm", "/etc/a\nb"]);
        let line = format!("denied by policy: {}", deny_reason(&decision));
        assert_eq!(line, "denied by policy: rm outside project: /etc/a\\nb");
        assert_eq!(line.lines().count(), 1);
    }

    #[test]
    fn test_dynamic_redirection_targets_are_invisible() {
        let p = work();
        assert_eq!(run(&p, &["sh", "-c", "echo hi > \"$OUT\""]), Decision::Allow);
    }

    #[test]
    fn test_unknown_programs_with_absolute_args_allowed() {
        let p = work();
        assert_eq!(run(&p, &["cat", "/etc/passwd"]), Decision::Allow);
        assert_eq!(run(&p, &["ls", "-la", "/"]), Decision::Allow);
    }
}

// ============================================================================
// Precedence & Determinism Tests
// ============================================================================

mod precedence_tests {
    use super::*;

    #[test]
    fn test_destructive_reason_wins_over_network() {
        let decision = run(
            &profile(NetworkPolicy::Off, &["/work"]),
            &["curl", "http://example.com", ">", "/etc/passwd"],
        );
        assert_eq!(
            decision,
            Decision::Deny(Denial::containment("redirect outside project: /etc/passwd"))
        );
    }

    #[test]
    fn test_system_tool_wins_over_everything() {
        let decision = run(
            &profile(NetworkPolicy::Off, &["/work"]),
            &["docker", "pull", "alpine", ">", "/etc/x"],
        );
        assert_eq!(deny_reason(&decision), "system-level tool blocked: docker");
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        let gate = ExecGate::new(p.clone());
        let cases: [&[&str]; 4] = [
            &["curl", "x"],
            &["rm", "/etc/passwd"],
            &["git", "status"],
            &["sudo", "true"],
        ];

        for argv in cases {
            let invocation = Invocation::from_args("/work", argv).unwrap();
            let first = gate.evaluate(&invocation);
            assert_eq!(gate.evaluate(&invocation), first);
            assert_eq!(decide(&p, &invocation), first);
            assert_eq!(decide(gate.profile(), &invocation), first);
        }
    }

    #[test]
    fn test_implicit_tmp_root_allows_writes() {
        let p = profile(NetworkPolicy::Off, &[]);
        assert_eq!(run(&p, &["touch", "/tmp/a"]), Decision::Allow);
        assert!(run(&p, &["touch", "/work/a"]).is_blocked());
    }

    #[test]
    fn test_classifiers_are_independent() {
        let containment_roots = vec![PathBuf::from("/work")];
        let invocation = Invocation::from_args("/work", &["wget", "-O", "/etc/x", "url"]).unwrap();
        let containment = Containment::new(&containment_roots, invocation.cwd());

        assert!(is_network_intent(&invocation));
        assert!(!is_system_level_tool(&invocation));
        assert_eq!(looks_destructive_outside_project(&invocation, &containment), None);
    }
}

// ============================================================================
// Sandbox Mode Tests
// ============================================================================

mod mode_tests {
    use super::*;

    fn read_only(network: NetworkPolicy) -> Profile {
        profile(network, &["/work"]).with_mode(SandboxMode::ReadOnly)
    }

    fn full_access(network: NetworkPolicy) -> Profile {
        profile(network, &["/work"]).with_mode(SandboxMode::FullAccess)
    }

    #[test]
    fn test_read_only_blocks_mutating_programs_inside_roots() {
        let p = read_only(NetworkPolicy::On);
        assert_eq!(
            run(&p, &["rm", "/work/a"]),
            Decision::Deny(Denial::containment("read-only mode blocks 'rm'"))
        );
        for argv in [
            vec!["touch", "/work/a"],
            vec!["cp", "a", "b"],
            vec!["sed", "s/a/b/", "f"],
            vec!["npm", "run", "build"],
            vec!["pip", "list"],
            vec!["sh", "-c", "true"],
            vec!["cargo", "build"],
            vec!["curl", "http://example.com"],
        ] {
            let decision = run(&p, &argv);
            assert_eq!(
                decision.denial().map(|d| d.kind),
                Some(DenialKind::Containment),
                "{argv:?}"
            );
        }
    }

    #[test]
    fn test_read_only_git() {
        let p = read_only(NetworkPolicy::On);
        for argv in [
            vec!["git", "status"],
            vec!["git", "diff", "HEAD~1"],
            vec!["git", "--no-pager", "log"],
            vec!["git", "-C", "sub", "ls-files"],
            vec!["git", "--version"],
        ] {
            assert_eq!(run(&p, &argv), Decision::Allow, "{argv:?}");
        }
        assert_eq!(
            deny_reason(&run(&p, &["git", "commit", "-m", "x"])),
            "read-only mode blocks 'git commit'"
        );
        assert_eq!(
            deny_reason(&run(&p, &["git", "checkout", "main"])),
            "read-only mode blocks 'git checkout'"
        );
    }

    #[test]
    fn test_read_only_allows_readers() {
        let p = read_only(NetworkPolicy::Off);
        assert_eq!(run(&p, &["ls", "-la", "/"]), Decision::Allow);
        assert_eq!(run(&p, &["cat", "/etc/hosts"]), Decision::Allow);
        assert_eq!(run(&p, &["grep", "-r", "TODO", "."]), Decision::Allow);
    }

    #[test]
    fn test_read_only_blocks_redirections_even_into_roots() {
        let p = read_only(NetworkPolicy::On);
        assert_eq!(
            deny_reason(&run(&p, &["echo", "hi", ">", "/work/out"])),
            "read-only mode blocks redirect: /work/out"
        );
        assert_eq!(
            deny_reason(&run(&p, &["echo", "hi", ">>relative.txt"])),
            "read-only mode blocks redirect: relative.txt"
        );
        assert_eq!(run(&p, &["make", "-n", "2>", "/dev/null"]), Decision::Allow);
        assert_eq!(run(&p, &["cmd", "2>&1"]), Decision::Allow);
    }

    #[test]
    fn test_read_only_still_applies_network_policy() {
        let p = read_only(NetworkPolicy::Off);
        assert_eq!(
            run(&p, &["git", "fetch"]).denial().map(|d| d.kind),
            Some(DenialKind::Containment)
        );
        assert_eq!(run(&p, &["ssh", "host"]), Decision::Allow);
    }

    #[test]
    fn test_full_access_allows_everything_but_system_tools() {
        let p = full_access(NetworkPolicy::Off);
        assert_eq!(run(&p, &["rm", "-rf", "/"]), Decision::Allow);
        assert_eq!(run(&p, &["curl", "http://example.com"]), Decision::Allow);
        assert_eq!(run(&p, &["echo", "x", ">", "/etc/motd"]), Decision::Allow);
        assert_eq!(
            run(&p, &["sudo", "true"]),
            Decision::Deny(Denial::containment("system-level tool blocked: sudo"))
        );
    }

    #[test]
    fn test_system_tools_blocked_in_every_mode() {
        for mode in [
            SandboxMode::ReadOnly,
            SandboxMode::WorkspaceWrite,
            SandboxMode::FullAccess,
        ] {
            let p = profile(NetworkPolicy::On, &["/"]).with_mode(mode);
            assert_eq!(
                deny_reason(&run(&p, &["mount", "/dev/sda1", "/mnt"])),
                "system-level tool blocked: mount",
                "{mode}"
            );
        }
    }

    #[test]
    fn test_workspace_write_is_the_default_mode() {
        let p = profile(NetworkPolicy::Off, &["/work"]);
        assert_eq!(p.mode(), SandboxMode::WorkspaceWrite);
        assert_eq!(run(&p, &["touch", "/work/a"]), Decision::Allow);
        assert!(run(&p, &["touch", "/etc/a"]).is_blocked());
    }
}
