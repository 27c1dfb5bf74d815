//! Reusable test content.

pub const BASIC_CONFIG: &str = r#"[project]
name = "galaxy"
repository = "git@github.com:example/galaxy.git"

[render]
ssm_prefix = "arn:aws:ssm:us-west-2:123456789012:parameter"

[stages.production]
branch = "production"
confirm = true

[stages.staging]
branch = "staging"
"#;

pub const HOSTS_FILE: &str = "\
Instance     Stage        Role         Host                   Name
--------------------------------------------------------------------------------
i-0a1        production   app-worker   app-1.example.com      galaxy-production-app
i-0a2        production   web          web-1.example.com      -
i-0b1        staging      app          stage-1.example.com    galaxy-staging-app
";

pub const TASK_TEMPLATE: &str = r#"{
  "family": "galaxy-__ENVIRONMENT__",
  "cpu": "128",
  "containerDefinitions": [
    {
      "name": "web",
      "image": "__IMAGE__",
      "environment": [{"name": "REVISION", "value": "__GIT_HASH__"}]
    }
  ]
}
"#;

pub const STAGING_ENVIRONMENT: &str = "\
environment:
  FOO: bar
secrets:
  API_KEY: path/to/key
cpu: 256
memory: 512
image: 123.dkr.ecr.us-west-2.amazonaws.com/galaxy
tags:
  team: platform
";
