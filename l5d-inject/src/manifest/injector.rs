use k8s_openapi::api::core::v1::{
    Capabilities, Container, EnvVar, EnvVarSource, ObjectFieldSelector, SecurityContext,
};
use l5d_inject_base::consts::k8s::{annotations, init_container};
use snafu::ResultExt;

use crate::{
    config::InjectionConfig,
    manifest::{Error, error, template::PodTemplate},
};

/// Outcome of [`inject`] on a single pod template.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Injection {
    Applied,
    /// The marker annotation was already present; nothing was changed.
    AlreadyInjected,
}

/// Adds the `init-linkerd` init container to a pod template.
///
/// The marker annotation is the only thing consulted to decide whether the
/// template was injected before; its value is ignored. Entries already listed
/// in the init containers annotation are kept in order, unknown keys
/// included, and the new container is appended after them.
///
/// # Errors
///
/// Returns [`Error::ParseInitContainers`] when the existing annotation is not
/// a JSON array, and [`Error::EncodeInitContainers`] when the new list cannot
/// be encoded.
pub fn inject(config: &InjectionConfig, template: &mut PodTemplate<'_>) -> Result<Injection, Error> {
    if template.has_annotation(annotations::LINKERD_DAEMONSET)? {
        return Ok(Injection::AlreadyInjected);
    }
    template
        .set_annotation(annotations::LINKERD_DAEMONSET, annotations::LINKERD_DAEMONSET_INJECTED)?;

    let index = template.index();
    let mut init_containers = match template.annotation(annotations::INIT_CONTAINERS)? {
        Some(value) => serde_json::from_str::<Option<Vec<serde_json::Value>>>(value)
            .context(error::ParseInitContainersSnafu { index, key: annotations::INIT_CONTAINERS })?
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let descriptor = serde_json::to_value(init_container(config))
        .context(error::EncodeInitContainersSnafu { index })?;
    init_containers.push(descriptor);

    let value = serde_json::to_string(&init_containers)
        .context(error::EncodeInitContainersSnafu { index })?;
    template.set_annotation(annotations::INIT_CONTAINERS, value)?;

    Ok(Injection::Applied)
}

/// The init container that installs the traffic redirection rules.
pub fn init_container(config: &InjectionConfig) -> Container {
    Container {
        name: init_container::NAME.to_string(),
        image: Some(init_container::IMAGE.to_string()),
        args: Some(config.init_args()),
        env: Some(vec![EnvVar {
            name: init_container::NODE_NAME_ENV.to_string(),
            value_from: Some(EnvVarSource {
                field_ref: Some(ObjectFieldSelector {
                    api_version: Some(init_container::FIELD_REF_API_VERSION.to_string()),
                    field_path: init_container::NODE_NAME_FIELD_PATH.to_string(),
                }),
                ..EnvVarSource::default()
            }),
            ..EnvVar::default()
        }]),
        image_pull_policy: Some(init_container::IMAGE_PULL_POLICY.to_string()),
        security_context: Some(SecurityContext {
            capabilities: Some(Capabilities {
                add: Some(vec![init_container::CAPABILITY_NET_ADMIN.to_string()]),
                ..Capabilities::default()
            }),
            ..SecurityContext::default()
        }),
        ..Container::default()
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;
    use crate::manifest::document::{Document, Workload};

    fn workload(raw: &str) -> Workload {
        match Document::parse(1, raw.as_bytes()).unwrap() {
            Document::Workload(workload) => workload,
            Document::Passthrough => panic!("expected a workload"),
        }
    }

    fn init_containers(workload: &mut Workload) -> Vec<serde_json::Value> {
        let template = workload.pod_template_mut().unwrap();
        let value = template.annotation(annotations::INIT_CONTAINERS).unwrap().unwrap();
        serde_json::from_str(value).unwrap()
    }

    #[test]
    fn test_descriptor_shape() {
        let descriptor = serde_json::to_value(init_container(&InjectionConfig::default())).unwrap();
        assert_eq!(
            descriptor,
            json!({
                "name": "init-linkerd",
                "image": "linkerd/istio-init:v1",
                "args": ["-p", "4140", "-m", "false", "-s", "L5D"],
                "env": [{
                    "name": "NODE_NAME",
                    "valueFrom": {
                        "fieldRef": { "apiVersion": "v1", "fieldPath": "spec.nodeName" }
                    }
                }],
                "imagePullPolicy": "IfNotPresent",
                "securityContext": { "capabilities": { "add": ["NET_ADMIN"] } }
            })
        );
    }

    #[test]
    fn test_inject_into_empty_template() {
        let mut deployment = workload("kind: Deployment\nspec:\n  template: {}\n");
        let mut template = deployment.pod_template_mut().unwrap();
        assert_eq!(inject(&InjectionConfig::default(), &mut template).unwrap(), Injection::Applied);
        assert_eq!(template.annotation(annotations::LINKERD_DAEMONSET).unwrap(), Some("injected"));

        let init_containers = init_containers(&mut deployment);
        assert_eq!(init_containers.len(), 1);
        assert_eq!(init_containers[0]["name"], "init-linkerd");
        assert_eq!(init_containers[0]["args"], json!(["-p", "4140", "-m", "false", "-s", "L5D"]));
    }

    #[test]
    fn test_marker_stops_injection_whatever_its_value() {
        let mut job = workload(indoc! {"
            kind: Job
            spec:
              template:
                metadata:
                  annotations:
                    alpha.istio.io/linkerd-daemonset: 'no'
        "});
        let before = job.object.clone();
        let mut template = job.pod_template_mut().unwrap();
        let injection = inject(&InjectionConfig::default(), &mut template).unwrap();
        assert_eq!(injection, Injection::AlreadyInjected);
        assert_eq!(job.object, before);
    }

    #[test]
    fn test_existing_entries_are_kept_in_front() {
        let mut daemon_set = workload(indoc! {r#"
            kind: DaemonSet
            spec:
              template:
                metadata:
                  annotations:
                    pod.beta.kubernetes.io/init-containers: '[{"name":"other","image":"busybox","x-extra":{"keep":true}}]'
        "#});
        let mut template = daemon_set.pod_template_mut().unwrap();
        let _injection = inject(&InjectionConfig::default(), &mut template).unwrap();

        let init_containers = init_containers(&mut daemon_set);
        assert_eq!(init_containers.len(), 2);
        assert_eq!(
            init_containers[0],
            json!({ "name": "other", "image": "busybox", "x-extra": { "keep": true } })
        );
        assert_eq!(init_containers[1]["name"], "init-linkerd");
    }

    #[test]
    fn test_null_init_containers_is_an_empty_list() {
        let mut job = workload(indoc! {"
            kind: Job
            spec:
              template:
                metadata:
                  annotations:
                    pod.beta.kubernetes.io/init-containers: 'null'
        "});
        let mut template = job.pod_template_mut().unwrap();
        let _injection = inject(&InjectionConfig::default(), &mut template).unwrap();
        assert_eq!(init_containers(&mut job).len(), 1);
    }

    #[test]
    fn test_invalid_init_containers_json() {
        for value in ["'[{'", "'{\"name\":\"other\"}'"] {
            let mut job = workload(&format!(
                "kind: Job\nspec:\n  template:\n    metadata:\n      annotations:\n        \
                 pod.beta.kubernetes.io/init-containers: {value}\n"
            ));
            let mut template = job.pod_template_mut().unwrap();
            let err = inject(&InjectionConfig::default(), &mut template).unwrap_err();
            assert!(matches!(err, Error::ParseInitContainers { index: 1, .. }), "{value}");
        }
    }

    #[test]
    fn test_custom_configuration() {
        let config = InjectionConfig {
            proxy_port: "9999".to_string(),
            proxy_service_name: "meshproxy".to_string(),
            use_service_vip: true,
        };
        let mut job = workload("kind: Job\n");
        let mut template = job.pod_template_mut().unwrap();
        let _injection = inject(&config, &mut template).unwrap();

        let init_containers = init_containers(&mut job);
        assert_eq!(
            init_containers[0]["args"],
            json!(["-p", "9999", "-m", "true", "-s", "MESHPROXY"])
        );
    }
}
