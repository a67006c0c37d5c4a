//! Argument schema derivation.
//!
//! An argument type declares its fields through [`CommandArgs::declare`].
//! [`derive`] validates that declaration once per type and caches the
//! resulting [`ArgumentSchema`], which publishes the option list and checks
//! raw options before [`CommandArgs::decode`] rebuilds the typed record.
//!
//! ```text
//! CommandArgs::declare ──▶ ArgsDeclaration ──▶ ArgumentSchema ──▶ Vec<OptionSchema>
//!                                                   │
//!            Vec<RawOption> ──▶ OptionReader ───────┴──▶ CommandArgs::decode ──▶ T
//! ```

mod choice;
mod declaration;
mod reader;
mod schema;
mod value;

pub use choice::{ChoiceEnum, choices_of, from_choice, from_value};
pub use declaration::{ArgBuilder, ArgsDeclaration, ArgumentDescriptor, CommandArgs};
pub use reader::OptionReader;
pub use schema::{
    ArgumentSchema, MAX_CHOICES, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_OPTIONS, derive,
};
pub use value::{
    ArgValue, AudioChannel, ChoiceArg, GuildChannel, MessageChannel, NewsChannel, SemanticType,
    StageChannel, TextChannel, ThreadChannel, VoiceChannel,
};

pub(crate) use schema::{validate_description, validate_name};

#[cfg(test)]
mod tests {
    use super::*;
    use cobalt_core::{
        Attachment, AttachmentId, ChannelId, ChannelRef, ChannelType, ChoiceValue, OptionKind,
        OptionValue, RawOption, RoleId, UserId, UserRef,
    };
    use cobalt_macros::{ChoiceEnum, CommandArgs};

    use crate::error::DecodeError;

    #[derive(Debug, Clone, Copy, PartialEq, ChoiceEnum)]
    #[choice(crate = "crate")]
    enum Severity {
        #[choice(label = "Warning only")]
        Warn,
        #[choice(value = "ban")]
        Ban,
    }

    #[derive(Debug, PartialEq, CommandArgs)]
    #[args(crate = "crate")]
    struct Punish {
        #[arg(description = "Who to punish")]
        user: UserRef,
        #[arg(description = "How hard")]
        severity: Severity,
        #[arg(
            description = "Audit category",
            choice(name = "Spam", value = "spam"),
            choice(name = "Abuse", value = "abuse")
        )]
        category: String,
        #[arg(description = "Days of messages to delete", default = "1")]
        days: i64,
        #[arg(description = "Role to strip", rename = "strip-role")]
        role: Option<RoleId>,
        #[arg(description = "Notify the user", default)]
        notify: bool,
    }

    #[derive(Debug, PartialEq, CommandArgs)]
    #[args(crate = "crate")]
    struct Query {
        #[arg(description = "search text")]
        query: String,
    }

    #[derive(Debug, PartialEq, CommandArgs)]
    #[args(crate = "crate")]
    struct Publish {
        #[arg(description = "File to publish")]
        file: Attachment,
        #[arg(description = "Crop ratio")]
        ratio: f64,
        #[arg(description = "Thumbnail scale")]
        scale: f32,
        #[arg(description = "Copies to post")]
        copies: i32,
        #[arg(description = "Where to post")]
        target: TextChannel,
        #[arg(description = "Where to announce")]
        stage: AudioChannel,
        #[arg(description = "Where to log")]
        log: GuildChannel,
        #[arg(description = "Kind of channel to mirror to")]
        mirror: ChannelType,
    }

    fn channel(id: u64, kind: ChannelType) -> ChannelRef {
        ChannelRef {
            id: ChannelId(id),
            kind,
        }
    }

    fn publish() -> Publish {
        Publish {
            file: Attachment {
                id: AttachmentId(11),
                filename: "cat.png".into(),
                url: "https://cdn.example/cat.png".into(),
                size: 2048,
                content_type: Some("image/png".into()),
            },
            ratio: 1.5,
            scale: 0.25,
            copies: -3,
            target: TextChannel(channel(1, ChannelType::GuildText)),
            stage: AudioChannel(channel(2, ChannelType::GuildStageVoice)),
            log: GuildChannel(channel(3, ChannelType::GuildForum)),
            mirror: ChannelType::PublicThread,
        }
    }

    #[test]
    fn test_media_and_channel_types_survive_encoding() {
        let schema = derive::<Publish>().unwrap();
        let kinds: Vec<_> = schema.descriptors().iter().map(|d| d.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                OptionKind::Attachment,
                OptionKind::Number,
                OptionKind::Number,
                OptionKind::Integer,
                OptionKind::Channel,
                OptionKind::Channel,
                OptionKind::Channel,
                OptionKind::Channel,
            ]
        );

        let value = publish();
        assert_eq!(schema.decode::<Publish>(&value.encode()), Ok(value));
    }

    #[test]
    fn test_numbers_accept_integer_records() {
        let schema = derive::<Publish>().unwrap();
        let mut options = publish().encode();
        for option in &mut options {
            match option.name.as_str() {
                "ratio" => option.value = OptionValue::Integer(2),
                "scale" => option.value = OptionValue::Integer(4),
                "copies" => option.value = OptionValue::Integer(i64::from(i32::MIN)),
                _ => {}
            }
        }

        let decoded = schema.decode::<Publish>(&options).unwrap();
        assert_eq!(decoded.ratio, 2.0);
        assert_eq!(decoded.scale, 4.0);
        assert_eq!(decoded.copies, i32::MIN);
        assert_eq!(schema.decode::<Publish>(&decoded.encode()), Ok(decoded));
    }

    #[test]
    fn test_channel_kind_is_checked() {
        let schema = derive::<Publish>().unwrap();
        let mut options = publish().encode();
        for option in &mut options {
            if option.name == "target" {
                option.value = OptionValue::Channel(channel(1, ChannelType::GuildVoice));
            }
        }
        assert!(matches!(
            schema.decode::<Publish>(&options),
            Err(DecodeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_derived_declaration() {
        let schema = derive::<Punish>().unwrap();
        let summary: Vec<_> = schema
            .descriptors()
            .iter()
            .map(|d| (d.name.as_str(), d.kind(), d.required()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("user", OptionKind::User, true),
                ("severity", OptionKind::String, true),
                ("category", OptionKind::String, true),
                ("days", OptionKind::Integer, false),
                ("strip-role", OptionKind::Role, false),
                ("notify", OptionKind::Boolean, false),
            ]
        );

        let severity = schema.get("severity").unwrap();
        assert_eq!(severity.choices[0].name, "Warning only");
        assert_eq!(severity.choices[0].value, ChoiceValue::String("Warn".into()));
        assert_eq!(severity.choices[1].value, ChoiceValue::String("ban".into()));
        assert_eq!(schema.get("category").unwrap().choices.len(), 2);
    }

    #[test]
    fn test_derived_encode_then_decode() {
        let punish = Punish {
            user: UserRef {
                id: UserId(4),
                name: "mallory".into(),
                member: true,
            },
            severity: Severity::Ban,
            category: "spam".into(),
            days: 7,
            role: Some(RoleId(9)),
            notify: true,
        };
        let schema = derive::<Punish>().unwrap();
        assert_eq!(schema.decode::<Punish>(&punish.encode()), Ok(punish));
    }

    #[test]
    fn test_derived_defaults() {
        let options = vec![
            RawOption::new(
                "user",
                OptionValue::User(UserRef {
                    id: UserId(4),
                    name: "mallory".into(),
                    member: false,
                }),
            ),
            RawOption::new("severity", OptionValue::String("Warn".into())),
            RawOption::new("category", OptionValue::String("abuse".into())),
        ];
        let punish = derive::<Punish>().unwrap().decode::<Punish>(&options).unwrap();
        assert_eq!(punish.severity, Severity::Warn);
        assert_eq!(punish.days, 1);
        assert_eq!(punish.role, None);
        assert!(!punish.notify);
    }

    #[test]
    fn test_query_scenario() {
        let schema = derive::<Query>().unwrap();
        let query = &schema.descriptors()[0];
        assert!(query.required());
        assert_eq!(query.kind(), OptionKind::String);
        assert!(query.choices.is_empty());
        assert!(!query.autocomplete);

        let decoded = schema
            .decode::<Query>(&[RawOption::new("query", OptionValue::String("abc".into()))])
            .unwrap();
        assert_eq!(decoded, Query { query: "abc".into() });
        assert_eq!(
            schema.decode::<Query>(&[]),
            Err(DecodeError::MissingRequired {
                name: "query".into(),
            })
        );
    }
}
